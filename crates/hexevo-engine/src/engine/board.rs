use arrayvec::ArrayVec;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    BoardConfigError, InvalidMove,
    core::{
        cell::{Axis, Cell, Player},
        chain::{ChainArena, ChainId, EdgeMask},
        snapshot::BoardSnapshot,
    },
};

use super::config::BoardConfig;

/// `(row, column)` offsets of the six hex neighbors.
///
/// The set is closed under negation, which is what makes a point reflection
/// of the board preserve adjacency.
const NEIGHBOR_OFFSETS: [(isize, isize); 6] = [(0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1)];

/// Result of a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum WinSignal {
    Ongoing,
    Won(Player),
}

/// One entry of the per-game move log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    pub player: Player,
    pub cell: usize,
    /// Zero-based index of the move within its game.
    pub turn: usize,
}

/// Hex board with incremental win detection.
///
/// Every stone belongs to a chain in a union-find arena (see
/// [`ChainArena`]). Placing a stone merges it with the chains of its
/// same-colored neighbors, so deciding whether the mover has won only looks
/// at the merged chain's edge mask and never rescans the board.
///
/// # Example
///
/// ```
/// use hexevo_engine::{Board, BoardConfig, Player, WinSignal};
///
/// let mut board = Board::new(BoardConfig::with_size(2)).unwrap();
/// // player A connects row 0 with row 1 by default
/// assert_eq!(board.place(0, Player::A).unwrap(), WinSignal::Ongoing);
/// assert_eq!(board.place(1, Player::B).unwrap(), WinSignal::Ongoing);
/// assert_eq!(board.place(2, Player::A).unwrap(), WinSignal::Won(Player::A));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    config: BoardConfig,
    cells: Vec<Cell>,
    chain_of: Vec<Option<ChainId>>,
    chains: ChainArena,
    first_player: Player,
    to_move: Player,
    winner: Option<Player>,
    history: Vec<MoveRecord>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// With [`FirstPlayer::Random`](super::FirstPlayer::Random) the opener is
    /// drawn from the thread-local generator; use [`Board::with_rng`] for
    /// reproducible games.
    pub fn new(config: BoardConfig) -> Result<Self, BoardConfigError> {
        Self::with_rng(config, &mut rand::rng())
    }

    pub fn with_rng<R>(config: BoardConfig, rng: &mut R) -> Result<Self, BoardConfigError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;
        let num_cells = config.size * config.size;
        let first_player = config.first_player.resolve(rng);
        Ok(Self {
            config,
            cells: vec![Cell::Empty; num_cells],
            chain_of: vec![None; num_cells],
            chains: ChainArena::with_capacity(num_cells),
            first_player,
            to_move: first_player,
            winner: None,
            history: Vec::with_capacity(num_cells),
        })
    }

    /// Rebuilds a board by replaying a move log.
    pub fn replay(config: BoardConfig, moves: &[MoveRecord]) -> Result<Self, ReplayError> {
        let mut board = Self::new(config)?;
        if let Some(first) = moves.first() {
            board.first_player = first.player;
            board.to_move = first.player;
        }
        for record in moves {
            board.place(record.cell, record.player)?;
        }
        Ok(board)
    }

    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.config.size
    }

    #[must_use]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    #[must_use]
    pub fn cell_at(&self, row: usize, column: usize) -> Cell {
        self.cells[self.index(row, column)]
    }

    #[must_use]
    pub fn index(&self, row: usize, column: usize) -> usize {
        debug_assert!(row < self.size() && column < self.size());
        row * self.size() + column
    }

    #[must_use]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.size(), index % self.size())
    }

    #[must_use]
    pub fn first_player(&self) -> Player {
        self.first_player
    }

    /// Player expected to move next.
    ///
    /// Updated by [`place`](Self::place) to the opponent of whoever just
    /// moved. The board itself does not enforce alternation.
    #[must_use]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// [`WinSignal::Won`] once a placement has completed a chain.
    #[must_use]
    pub fn status(&self) -> WinSignal {
        self.winner.map_or(WinSignal::Ongoing, WinSignal::Won)
    }

    #[must_use]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    #[must_use]
    pub fn is_feasible(&self, index: usize) -> bool {
        self.winner.is_none() && self.cells.get(index).is_some_and(|c| c.is_empty())
    }

    /// Cells accepted by [`place`](Self::place), in ascending order.
    ///
    /// These are the empty cells while the game is ongoing and nothing once
    /// it has been won, matching [`is_feasible`](Self::is_feasible).
    #[must_use]
    pub fn feasible_moves(&self) -> Vec<usize> {
        if self.winner.is_some() {
            return vec![];
        }
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.is_empty().then_some(i))
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::new(self.size(), self.cells.clone())
    }

    /// Places a stone of `player` on `index`.
    ///
    /// Returns [`WinSignal::Won`] when the stone completes a chain between
    /// both of `player`'s goal edges. Once a game is won every further
    /// placement fails with [`InvalidMove::GameOver`].
    pub fn place(&mut self, index: usize, player: Player) -> Result<WinSignal, InvalidMove> {
        if let Some(winner) = self.winner {
            return Err(InvalidMove::GameOver { winner });
        }
        let num_cells = self.num_cells();
        let Some(cell) = self.cells.get(index).copied() else {
            return Err(InvalidMove::OutOfBounds {
                cell: index,
                num_cells,
            });
        };
        if let Cell::Stone(owner) = cell {
            return Err(InvalidMove::Occupied { cell: index, owner });
        }

        let (row, column) = self.coords(index);
        self.cells[index] = Cell::Stone(player);
        let edges = self.goal_edges(player, row, column);
        let mut chain = self.chains.make_chain(edges);
        for neighbor in self.neighbors(index) {
            if self.cells[neighbor] != Cell::Stone(player) {
                continue;
            }
            if let Some(other) = self.chain_of[neighbor] {
                chain = self.chains.union(chain, other);
            }
        }
        self.chain_of[index] = Some(chain);
        self.history.push(MoveRecord {
            player,
            cell: index,
            turn: self.history.len(),
        });
        self.to_move = player.opponent();

        if self.chains.edges(chain).is_spanning() {
            self.winner = Some(player);
            return Ok(WinSignal::Won(player));
        }
        Ok(WinSignal::Ongoing)
    }

    /// Clears the board; the opener is resolved again from the config.
    pub fn reset(&mut self) {
        self.reset_with(&mut rand::rng());
    }

    pub fn reset_with<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.cells.fill(Cell::Empty);
        self.chain_of.fill(None);
        self.chains.clear();
        self.history.clear();
        self.winner = None;
        self.first_player = self.config.first_player.resolve(rng);
        self.to_move = self.first_player;
    }

    /// Reflects the board through its center.
    ///
    /// Cell `(r, c)` moves to `(N-1-r, N-1-c)`. Chain memberships travel with
    /// their cells, and since the reflection exchanges each player's two goal
    /// edges, every chain's edge flags are swapped. The move log is remapped
    /// the same way. Applying `flip` twice restores the original board.
    pub fn flip(&mut self) {
        self.cells.reverse();
        self.chain_of.reverse();
        self.chains.swap_edges();
        let last = self.num_cells() - 1;
        for record in &mut self.history {
            record.cell = last - record.cell;
        }
    }

    /// Edge mask of the chain that contains `index`, if the cell is occupied.
    #[must_use]
    pub fn chain_edges(&self, index: usize) -> Option<EdgeMask> {
        self.chain_of[index].map(|id| self.chains.edges(id))
    }

    /// Returns `true` if both cells are occupied and belong to the same chain.
    #[must_use]
    pub fn same_chain(&self, a: usize, b: usize) -> bool {
        match (self.chain_of[a], self.chain_of[b]) {
            (Some(x), Some(y)) => self.chains.root(x) == self.chains.root(y),
            _ => false,
        }
    }

    /// Number of distinct chains currently on the board.
    #[must_use]
    pub fn chain_count(&self) -> usize {
        let mut roots: Vec<ChainId> = self
            .chain_of
            .iter()
            .flatten()
            .map(|id| self.chains.root(*id))
            .collect();
        roots.sort_unstable();
        roots.dedup();
        roots.len()
    }

    fn goal_edges(&self, player: Player, row: usize, column: usize) -> EdgeMask {
        let coordinate = match self.config.axis_of(player) {
            Axis::Rows => row,
            Axis::Columns => column,
        };
        let mut edges = EdgeMask::NONE;
        if coordinate == 0 {
            edges |= EdgeMask::FIRST;
        }
        if coordinate == self.size() - 1 {
            edges |= EdgeMask::SECOND;
        }
        edges
    }

    fn neighbors(&self, index: usize) -> ArrayVec<usize, 6> {
        let (row, column) = self.coords(index);
        let n = self.size();
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let r = row.checked_add_signed(dr).filter(|r| *r < n)?;
                let c = column.checked_add_signed(dc).filter(|c| *c < n)?;
                Some(r * n + c)
            })
            .collect()
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ReplayError {
    #[display("invalid board configuration: {_0}")]
    Config(BoardConfigError),
    #[display("invalid move in log: {_0}")]
    Move(InvalidMove),
}
