//! Game phases.

use serde::{Deserialize, Serialize};

/// Where the game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed but not yet set up.
    Setup,
    /// Accepting moves.
    Playing,
    /// The win value was reached. With `keep_playing` set the game
    /// accepts moves exactly like [`GamePhase::Playing`].
    Won {
        /// The player chose to continue after winning.
        keep_playing: bool,
    },
    /// No moves remain. Terminal.
    Over,
}

impl GamePhase {
    /// Derives the phase from the engine flags. `over` wins over `won`.
    pub fn from_flags(started: bool, over: bool, won: bool, keep_playing: bool) -> Self {
        match (started, over, won) {
            (false, _, _) => Self::Setup,
            (true, true, _) => Self::Over,
            (true, false, true) => Self::Won { keep_playing },
            (true, false, false) => Self::Playing,
        }
    }

    /// Over, or won without choosing to keep playing.
    pub fn is_terminated(self) -> bool {
        matches!(self, Self::Over | Self::Won { keep_playing: false })
    }

    /// Whether a move may be applied in this phase.
    pub fn accepts_moves(self) -> bool {
        matches!(self, Self::Playing | Self::Won { keep_playing: true })
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Playing => write!(f, "playing"),
            Self::Won { keep_playing: true } => write!(f, "won (playing on)"),
            Self::Won { keep_playing: false } => write!(f, "won"),
            Self::Over => write!(f, "over"),
        }
    }
}
