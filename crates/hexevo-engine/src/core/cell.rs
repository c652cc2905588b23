use serde::{Deserialize, Serialize};

/// One of the two Hex players.
///
/// Player `A` moves first unless the board configuration says otherwise.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
pub enum Player {
    #[display("A")]
    A,
    #[display("B")]
    B,
}

impl Player {
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Index of the player (`A` = 0, `B` = 1), handy for per-player arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Cell {
    #[default]
    Empty,
    Stone(Player),
}

impl Cell {
    /// Token used by the textual snapshot format.
    #[must_use]
    pub const fn token(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Stone(Player::A) => 'A',
            Self::Stone(Player::B) => 'B',
        }
    }

    #[must_use]
    pub const fn from_token(token: char) -> Option<Self> {
        match token {
            '.' => Some(Self::Empty),
            'A' | 'a' => Some(Self::Stone(Player::A)),
            'B' | 'b' => Some(Self::Stone(Player::B)),
            _ => None,
        }
    }

    #[must_use]
    pub const fn owner(self) -> Option<Player> {
        match self {
            Self::Empty => None,
            Self::Stone(player) => Some(player),
        }
    }
}

/// A pair of opposite board edges a player has to connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Row 0 and row N-1.
    #[default]
    Rows,
    /// Column 0 and column N-1.
    Columns,
}

impl Axis {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Rows => Self::Columns,
            Self::Columns => Self::Rows,
        }
    }
}
