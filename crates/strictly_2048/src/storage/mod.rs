//! Key/value persistence for best score and saved games.

mod error;
mod memory;
mod persistence;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use persistence::{BEST_SCORE_KEY, GAME_STATE_KEY, PersistenceStore};

/// A durable string key/value store.
///
/// The composing application owns the backend and hands it to the engine.
pub trait KeyValueStore {
    /// Reads a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a value, replacing any previous one.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Deletes a key. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
