//! Strictly 2048 - sliding-tile merge game logic.
//!
//! This crate holds the deterministic core of the game: the board, the
//! move-resolution rules, the game state machine, oracle strength tiers,
//! and versioned persistence over an injected key/value store. It has no
//! async runtime; the autoplay loop lives in `strictly_autoplay`.
//!
//! # Example
//!
//! ```
//! use strictly_2048::{Direction, GameConfig, GameEngine, MemoryStore};
//!
//! let mut engine = GameEngine::new(GameConfig::default(), MemoryStore::new());
//! engine.setup();
//! assert_eq!(engine.grid().tiles().count(), 2);
//!
//! let _outcome = engine.move_tiles(Direction::Left);
//! assert!(engine.score() % 2 == 0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod engine;
mod grid;
mod phase;
mod position;
mod state;
mod storage;
mod strength;
mod tile;

pub mod invariants;
pub mod rules;

// Crate-level exports - Board
pub use grid::{Grid, SerializedGrid, SerializedTile, is_tile_value};
pub use position::{Direction, Position, Traversal, Vector};
pub use tile::Tile;

// Crate-level exports - State machine
pub use engine::{GameEngine, MoveOutcome};
pub use phase::GamePhase;
pub use rules::MoveResolution;

// Crate-level exports - Oracle tuning
pub use strength::{MAX_STRENGTH, MIN_STRENGTH, STRENGTH_TIERS, Strength, StrengthTier};

// Crate-level exports - Persistence
pub use state::{GAME_STATE_VERSION, GameState, SavedGame};
pub use storage::{
    BEST_SCORE_KEY, GAME_STATE_KEY, KeyValueStore, MemoryStore, PersistenceStore, StoreError,
};

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};
