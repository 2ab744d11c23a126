//! Serializable game snapshots.

use crate::{SerializedGrid, Strength};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Current persisted schema version.
///
/// Any stored blob carrying a different version is discarded, never migrated.
pub const GAME_STATE_VERSION: u32 = 1;

/// Everything needed to resume a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    grid: SerializedGrid,
    score: u32,
    over: bool,
    won: bool,
    keep_playing: bool,
    ai_strength: Strength,
}

impl GameState {
    /// Creates a snapshot.
    pub fn new(
        grid: SerializedGrid,
        score: u32,
        over: bool,
        won: bool,
        keep_playing: bool,
        ai_strength: Strength,
    ) -> Self {
        Self {
            grid,
            score,
            over,
            won,
            keep_playing,
            ai_strength,
        }
    }
}

/// The stored envelope: a schema tag plus the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    /// Schema version the state was written with.
    pub version: u32,
    /// The saved state.
    pub state: GameState,
}

impl SavedGame {
    /// Wraps a state with the current schema version.
    pub fn current(state: GameState) -> Self {
        Self {
            version: GAME_STATE_VERSION,
            state,
        }
    }
}
