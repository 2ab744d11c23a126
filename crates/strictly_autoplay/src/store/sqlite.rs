//! Key/value store over a SQLite file.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use strictly_2048::{KeyValueStore, StoreError};
use tracing::{debug, info, instrument};

use crate::store::{KvEntry, NewKvEntry, schema};

/// Schema migrations applied by [`SqliteStore::open`].
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Wraps a backend failure, keeping the caller's location.
#[track_caller]
fn db_error(context: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::new(format!("{}: {}", context, err))
}

/// SQLite-backed [`KeyValueStore`].
///
/// Opens a fresh connection per operation, so the store is cheap to clone
/// and holds no handle between calls.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens the database at `db_path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        let store = Self { db_path };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| db_error("Migrations failed", e))?;
        info!(path = %store.db_path, migrations = applied.len(), "SqliteStore opened");
        Ok(store)
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| db_error(&format!("Failed to connect to '{}'", self.db_path), e))
    }

    /// Loads every entry, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entries(&self) -> Result<Vec<KvEntry>, StoreError> {
        let mut conn = self.connection()?;
        let entries = schema::kv_entries::table
            .order(schema::kv_entries::key.asc())
            .select(KvEntry::as_select())
            .load(&mut conn)
            .map_err(|e| db_error("Failed to list entries", e))?;
        debug!(count = entries.len(), "Entries loaded");
        Ok(entries)
    }
}

impl KeyValueStore for SqliteStore {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection()?;
        let entry = schema::kv_entries::table
            .find(key)
            .select(KvEntry::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| db_error("Failed to read entry", e))?;
        debug!(found = entry.is_some(), "Entry lookup");
        Ok(entry.map(|entry| entry.value().clone()))
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let entry = NewKvEntry::new(key.to_string(), value, chrono::Utc::now().naive_utc());
        diesel::replace_into(schema::kv_entries::table)
            .values(&entry)
            .execute(&mut conn)
            .map_err(|e| db_error("Failed to write entry", e))?;
        debug!("Entry written");
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(schema::kv_entries::table.find(key))
            .execute(&mut conn)
            .map_err(|e| db_error("Failed to remove entry", e))?;
        debug!(removed, "Entry removed");
        Ok(())
    }
}
