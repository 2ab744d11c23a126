//! Tests for the SQLite key/value store.

use rand::SeedableRng;
use rand::rngs::StdRng;
use strictly_2048::{
    BEST_SCORE_KEY, GAME_STATE_KEY, GameConfig, GameEngine, KeyValueStore,
};
use strictly_autoplay::{AutoplayConfig, SqliteStore, open_backend};
use tempfile::NamedTempFile;

/// Creates a temporary database file and an opened store. The file handle
/// must stay in scope to keep the file alive.
fn setup_test_db() -> (NamedTempFile, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(db_path).expect("Failed to open store");
    (db_file, store)
}

#[test]
fn test_missing_key_is_none() {
    let (_db, store) = setup_test_db();
    assert_eq!(store.get("nothing").expect("get"), None);
}

#[test]
fn test_set_then_overwrite() {
    let (_db, mut store) = setup_test_db();

    store.set(BEST_SCORE_KEY, "10".to_string()).expect("set");
    assert_eq!(store.get(BEST_SCORE_KEY).expect("get").as_deref(), Some("10"));

    store.set(BEST_SCORE_KEY, "42".to_string()).expect("overwrite");
    assert_eq!(store.get(BEST_SCORE_KEY).expect("get").as_deref(), Some("42"));

    let entries = store.entries().expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].key(), BEST_SCORE_KEY);
}

#[test]
fn test_remove() {
    let (_db, mut store) = setup_test_db();
    store.set(GAME_STATE_KEY, "{}".to_string()).expect("set");

    store.remove(GAME_STATE_KEY).expect("remove");
    assert_eq!(store.get(GAME_STATE_KEY).expect("get"), None);

    // Removing an absent key is not an error.
    store.remove(GAME_STATE_KEY).expect("remove again");
}

#[test]
fn test_entries_survive_reopen() {
    let (_db, mut store) = setup_test_db();
    store.set("a", "1".to_string()).expect("set");
    store.set("b", "2".to_string()).expect("set");

    let reopened = SqliteStore::open(store.db_path().to_string()).expect("reopen");
    let keys: Vec<String> = reopened
        .entries()
        .expect("entries")
        .iter()
        .map(|entry| entry.key().clone())
        .collect();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_game_resumes_from_sqlite() {
    let (_db, store) = setup_test_db();
    let path = store.db_path().to_string();

    let mut engine = GameEngine::with_rng(GameConfig::default(), store, StdRng::seed_from_u64(8));
    engine.setup();
    let direction = engine.legal_directions()[0];
    assert!(engine.move_tiles(direction).moved());

    let reopened = SqliteStore::open(path).expect("reopen");
    let mut resumed = GameEngine::new(GameConfig::default(), reopened);
    assert!(resumed.setup().is_some());
    assert_eq!(resumed.score(), engine.score());
    assert_eq!(resumed.grid().for_oracle(), engine.grid().for_oracle());
    assert_eq!(resumed.best_score(), engine.best_score());
}

#[test]
fn test_open_fails_for_unreachable_path() {
    let result = SqliteStore::open("/nonexistent/dir/game.db".to_string());
    assert!(result.is_err());
}

#[test]
fn test_open_backend_follows_config() {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let toml = format!("database_path = {:?}", db_file.path().to_str().expect("path"));
    let config = AutoplayConfig::from_toml(&toml).expect("config");

    let mut backend = open_backend(&config).expect("sqlite backend");
    backend.set("k", "v".to_string()).expect("set");

    let direct = SqliteStore::open(config.database_path().clone().expect("path")).expect("open");
    assert_eq!(direct.get("k").expect("get").as_deref(), Some("v"));

    let mut memory = open_backend(&AutoplayConfig::default()).expect("memory backend");
    memory.set("k", "v".to_string()).expect("set");
    assert_eq!(memory.get("k").expect("get").as_deref(), Some("v"));
}
