//! Best score and saved-game records on top of a key/value backend.

use tracing::{debug, info, instrument, warn};

use crate::storage::{KeyValueStore, StoreError};
use crate::{GAME_STATE_VERSION, GameState, SavedGame};

/// Key holding the best score as a decimal integer.
pub const BEST_SCORE_KEY: &str = "bestScore";

/// Key holding the JSON-encoded [`SavedGame`].
pub const GAME_STATE_KEY: &str = "gameState";

/// Typed access to the two persisted records.
///
/// Reads never fail: a missing, unreadable, or stale record is reported as
/// absent. Writes return the backend error to the caller.
#[derive(Debug, Clone)]
pub struct PersistenceStore<S> {
    backend: S,
}

impl<S: KeyValueStore> PersistenceStore<S> {
    /// Wraps a backend.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Mutable access to the underlying backend.
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Unwraps the backend.
    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Best score recorded so far, `0` if none.
    #[instrument(skip(self))]
    pub fn best_score(&self) -> u32 {
        match self.backend.get(BEST_SCORE_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|e| {
                warn!(raw = %raw, error = %e, "Ignoring unparsable best score");
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                warn!(error = %e, "Failed to read best score");
                0
            }
        }
    }

    /// Records a new best score.
    #[instrument(skip(self))]
    pub fn set_best_score(&mut self, score: u32) -> Result<(), StoreError> {
        debug!("Writing best score");
        self.backend.set(BEST_SCORE_KEY, score.to_string())
    }

    /// Loads the saved game if one exists under the current schema.
    #[instrument(skip(self))]
    pub fn load_game(&self) -> Option<GameState> {
        let raw = match self.backend.get(GAME_STATE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved game");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved game");
                return None;
            }
        };

        let saved: SavedGame = match serde_json::from_str(&raw) {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Discarding unparsable saved game");
                return None;
            }
        };

        if saved.version != GAME_STATE_VERSION {
            warn!(
                stored = saved.version,
                current = GAME_STATE_VERSION,
                "Discarding saved game with mismatched schema version"
            );
            return None;
        }

        info!(score = saved.state.score(), "Loaded saved game");
        Some(saved.state)
    }

    /// Saves a game under the current schema version.
    #[instrument(skip(self, state), fields(score = state.score()))]
    pub fn save_game(&mut self, state: GameState) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&SavedGame::current(state))?;
        self.backend.set(GAME_STATE_KEY, encoded)
    }

    /// Deletes the saved game.
    #[instrument(skip(self))]
    pub fn clear_game(&mut self) -> Result<(), StoreError> {
        debug!("Clearing saved game");
        self.backend.remove(GAME_STATE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grid, MemoryStore, Strength};

    fn sample_state() -> GameState {
        GameState::new(Grid::new(4).serialize(), 128, false, false, false, Strength::clamped(5))
    }

    #[test]
    fn test_best_score_defaults_to_zero() {
        let store = PersistenceStore::new(MemoryStore::new());
        assert_eq!(store.best_score(), 0);
    }

    #[test]
    fn test_garbage_best_score_reads_as_zero() {
        let mut backend = MemoryStore::new();
        backend.set(BEST_SCORE_KEY, "lots".to_string()).expect("set");
        let store = PersistenceStore::new(backend);
        assert_eq!(store.best_score(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = PersistenceStore::new(MemoryStore::new());
        store.save_game(sample_state()).expect("save");
        assert_eq!(store.load_game(), Some(sample_state()));

        store.clear_game().expect("clear");
        assert_eq!(store.load_game(), None);
    }

    #[test]
    fn test_version_mismatch_is_absent() {
        let mut backend = MemoryStore::new();
        let stale = SavedGame {
            version: GAME_STATE_VERSION + 1,
            state: sample_state(),
        };
        backend
            .set(GAME_STATE_KEY, serde_json::to_string(&stale).expect("encode"))
            .expect("set");

        let store = PersistenceStore::new(backend);
        assert_eq!(store.load_game(), None);
    }

    #[test]
    fn test_unparsable_state_is_absent() {
        let mut backend = MemoryStore::new();
        backend.set(GAME_STATE_KEY, "{not json".to_string()).expect("set");
        let store = PersistenceStore::new(backend);
        assert_eq!(store.load_game(), None);
    }
}
