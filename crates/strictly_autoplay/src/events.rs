//! Commands into a session and snapshots out of it.

use derive_getters::Getters;
use strictly_2048::{Direction, GameEngine, GamePhase, Grid, KeyValueStore, Strength};

/// Everything that can be asked of a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum GameCommand {
    /// Slide tiles.
    #[display("move {}", _0)]
    Move(Direction),
    /// Throw the game away and start over.
    #[display("restart")]
    Restart,
    /// Continue after a win.
    #[display("keep playing")]
    KeepPlaying,
    /// Raise oracle strength.
    #[display("strength up")]
    StrengthUp,
    /// Lower oracle strength.
    #[display("strength down")]
    StrengthDown,
    /// Turn autoplay on or off.
    #[display("toggle autoplay")]
    ToggleAutoplay,
    /// End the session.
    #[display("quit")]
    Quit,
}

/// What a presentation layer is shown after each state change.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct Snapshot {
    /// The board.
    grid: Grid,
    /// Current score.
    score: u32,
    /// Best score across games.
    best_score: u32,
    /// No moves remain.
    over: bool,
    /// The win value was reached.
    won: bool,
    /// Over, or won without continuing.
    terminated: bool,
    /// Phase derived from the engine flags; `Over` wins over `Won`.
    phase: GamePhase,
    /// Oracle strength.
    strength: Strength,
    /// Whether the oracle is driving.
    autoplay_enabled: bool,
}

impl Snapshot {
    /// Captures the engine's current state. The `over` and `won` flags are
    /// the engine's own, so a winning move that also locks the board
    /// reports both.
    pub fn from_engine<S: KeyValueStore>(
        engine: &GameEngine<S>,
        strength: Strength,
        autoplay_enabled: bool,
    ) -> Self {
        let phase = engine.phase();
        Self {
            grid: engine.grid().clone(),
            score: engine.score(),
            best_score: engine.best_score(),
            over: engine.is_over(),
            won: engine.is_won(),
            terminated: phase.is_terminated(),
            phase,
            strength,
            autoplay_enabled,
        }
    }
}
