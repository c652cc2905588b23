use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    BoardConfigError,
    core::cell::{Axis, Player},
};

/// Board size used when nothing else is configured.
pub const DEFAULT_BOARD_SIZE: usize = 5;

/// Who opens a game after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstPlayer {
    Fixed(Player),
    Random,
}

impl Default for FirstPlayer {
    fn default() -> Self {
        Self::Fixed(Player::A)
    }
}

impl FirstPlayer {
    /// Resolves the opening player, flipping a coin for [`FirstPlayer::Random`].
    pub fn resolve<R>(self, rng: &mut R) -> Player
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Fixed(player) => player,
            Self::Random => {
                if rng.random_bool(0.5) {
                    Player::A
                } else {
                    Player::B
                }
            }
        }
    }
}

/// Static configuration of a [`Board`](crate::Board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Side length `N` of the `N×N` board.
    pub size: usize,
    pub first_player: FirstPlayer,
    /// Edges player A has to connect; player B connects the other pair.
    pub a_connects: Axis,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            first_player: FirstPlayer::default(),
            a_connects: Axis::Rows,
        }
    }
}

impl BoardConfig {
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn axis_of(&self, player: Player) -> Axis {
        match player {
            Player::A => self.a_connects,
            Player::B => self.a_connects.other(),
        }
    }

    pub fn validate(&self) -> Result<(), BoardConfigError> {
        if self.size == 0 {
            return Err(BoardConfigError::ZeroSize);
        }
        // cell indices are stored as u32 inside the chain arena
        if self.size.checked_mul(self.size).is_none_or(|n| n > u32::MAX as usize) {
            return Err(BoardConfigError::TooLarge { size: self.size });
        }
        Ok(())
    }
}
