//! SQLite-backed key/value storage.

mod models;
mod schema; // Diesel schema - internal use only
mod sqlite;

pub use models::{KvEntry, NewKvEntry};
pub use sqlite::{MIGRATIONS, SqliteStore};

use strictly_2048::{KeyValueStore, MemoryStore, StoreError};
use tracing::{info, instrument};

use crate::AutoplayConfig;

/// Opens the backend named by the configuration: SQLite when a database
/// path is set, memory otherwise.
///
/// # Errors
///
/// Returns [`StoreError`] if the SQLite file cannot be opened or migrated.
#[instrument(skip(config), fields(database_path = ?config.database_path()))]
pub fn open_backend(config: &AutoplayConfig) -> Result<Box<dyn KeyValueStore + Send>, StoreError> {
    match config.database_path() {
        Some(path) => Ok(Box::new(SqliteStore::open(path.clone())?)),
        None => {
            info!("No database path configured; using memory storage");
            Ok(Box::new(MemoryStore::new()))
        }
    }
}
