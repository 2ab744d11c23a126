//! Tests for the game state machine.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use strictly_2048::{
    Direction, GAME_STATE_KEY, GameConfig, GameEngine, GamePhase, GameState, Grid, KeyValueStore,
    MemoryStore, MoveOutcome, PersistenceStore, Position, Strength,
};

/// Installs a test subscriber once; `RUST_LOG` picks the level.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Builds an engine resumed from a saved game holding `rows`.
fn engine_with(rows: [[u32; 4]; 4], score: u32) -> GameEngine<MemoryStore> {
    init_tracing();
    let flat: Vec<u32> = rows.iter().flatten().copied().collect();
    let grid = Grid::from_flat(&flat).expect("valid board");

    let mut store = PersistenceStore::new(MemoryStore::new());
    store
        .save_game(GameState::new(
            grid.serialize(),
            score,
            false,
            false,
            false,
            Strength::default(),
        ))
        .expect("save");

    let mut engine = GameEngine::with_rng(
        GameConfig::default(),
        store.into_backend(),
        StdRng::seed_from_u64(1),
    );
    engine.setup().expect("resumed game carries a strength");
    engine
}

fn value_at(engine: &GameEngine<MemoryStore>, x: i32, y: i32) -> Option<u32> {
    engine.grid().tile_at(Position::new(x, y)).map(|tile| tile.value())
}

#[test]
fn test_fresh_setup_spawns_start_tiles() {
    let mut engine = GameEngine::with_rng(
        GameConfig::default(),
        MemoryStore::new(),
        StdRng::seed_from_u64(9),
    );
    assert_eq!(engine.phase(), GamePhase::Setup);

    assert_eq!(engine.setup(), None);
    assert_eq!(engine.phase(), GamePhase::Playing);
    assert_eq!(engine.score(), 0);

    let values: Vec<u32> = engine.grid().tiles().map(|tile| tile.value()).collect();
    assert_eq!(values.len(), 2);
    assert!(values.iter().all(|&v| v == 2 || v == 4));

    // The fresh game is persisted straight away.
    assert!(engine.persistence().load_game().is_some());
}

#[test]
fn test_merge_pair_left() {
    let mut engine = engine_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], 0);

    let outcome = engine.move_tiles(Direction::Left);

    assert_eq!(outcome, MoveOutcome::Moved { score_gained: 4 });
    assert_eq!(engine.score(), 4);
    assert_eq!(value_at(&engine, 0, 0), Some(4));
    // The merged tile plus one spawned tile.
    assert_eq!(engine.grid().tiles().count(), 2);
}

#[test]
fn test_blocked_move_changes_nothing() {
    let mut engine = engine_with([[2, 4, 8, 16], [0; 4], [0; 4], [0; 4]], 12);
    let saved_before = engine.persistence().backend().get(GAME_STATE_KEY).expect("read");
    let grid_before = engine.grid().clone();

    let outcome = engine.move_tiles(Direction::Up);

    assert_eq!(outcome, MoveOutcome::Blocked);
    assert_eq!(engine.grid().for_oracle(), grid_before.for_oracle());
    assert_eq!(engine.score(), 12);
    let saved_after = engine.persistence().backend().get(GAME_STATE_KEY).expect("read");
    assert_eq!(saved_before, saved_after);
}

#[test]
fn test_win_stops_play_until_keep_playing() {
    let mut engine = engine_with([[32768, 32768, 0, 0], [0; 4], [0; 4], [0; 4]], 0);

    assert!(engine.move_tiles(Direction::Left).moved());
    assert!(engine.is_won());
    assert_eq!(engine.phase(), GamePhase::Won { keep_playing: false });
    assert!(engine.is_terminated());
    assert_eq!(value_at(&engine, 0, 0), Some(65536));

    assert_eq!(engine.move_tiles(Direction::Right), MoveOutcome::Ignored);

    engine.keep_playing();
    assert_eq!(engine.phase(), GamePhase::Won { keep_playing: true });
    assert!(!engine.is_terminated());
    assert!(engine.move_tiles(Direction::Right).moved());
}

#[test]
fn test_win_not_triggered_below_threshold() {
    let mut engine = engine_with([[16384, 16384, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
    assert!(engine.move_tiles(Direction::Left).moved());
    assert!(!engine.is_won());
    assert_eq!(engine.phase(), GamePhase::Playing);
}

#[test]
fn test_game_over_clears_saved_game() {
    let mut engine = engine_with(
        [
            [4, 4, 16, 32],
            [64, 128, 256, 512],
            [128, 256, 512, 1024],
            [256, 512, 1024, 2048],
        ],
        100,
    );

    let outcome = engine.move_tiles(Direction::Right);

    assert_eq!(outcome, MoveOutcome::Moved { score_gained: 8 });
    assert!(engine.is_over());
    assert_eq!(engine.phase(), GamePhase::Over);
    assert!(!engine.moves_available());
    assert!(engine.legal_directions().is_empty());
    assert_eq!(engine.persistence().load_game(), None);
    assert_eq!(engine.best_score(), 108);
    assert_eq!(engine.move_tiles(Direction::Left), MoveOutcome::Ignored);
}

#[test]
fn test_score_gain_matches_merged_tiles() {
    let mut engine = GameEngine::with_rng(
        GameConfig::default(),
        MemoryStore::new(),
        StdRng::seed_from_u64(2024),
    );
    engine.setup();
    let mut chooser = StdRng::seed_from_u64(77);
    let directions: Vec<Direction> = Direction::all().collect();

    for _ in 0..300 {
        if engine.is_terminated() {
            break;
        }
        let before = engine.score();
        let direction = *directions.choose(&mut chooser).expect("four directions");

        match engine.move_tiles(direction) {
            MoveOutcome::Moved { score_gained } => {
                let merged_total: u32 = engine
                    .grid()
                    .tiles()
                    .filter(|tile| tile.is_merge_product())
                    .map(|tile| tile.value())
                    .sum();
                assert_eq!(score_gained, merged_total);
                assert_eq!(engine.score(), before + score_gained);
            }
            MoveOutcome::Blocked => assert_eq!(engine.score(), before),
            MoveOutcome::Ignored => panic!("live game ignored a move"),
        }
        assert!(engine.best_score() >= engine.score());
    }
}

#[test]
fn test_spawn_distribution() {
    let mut engine = GameEngine::with_rng(
        GameConfig::default(),
        MemoryStore::new(),
        StdRng::seed_from_u64(31337),
    );
    engine.setup();

    let mut fours = 0usize;
    let mut total = 0usize;
    for _ in 0..5000 {
        engine.restart();
        for tile in engine.grid().tiles() {
            total += 1;
            if tile.value() == 4 {
                fours += 1;
            }
        }
    }

    assert_eq!(total, 10_000);
    let ratio = fours as f64 / total as f64;
    assert!((0.08..0.12).contains(&ratio), "four ratio {ratio}");
}

#[test]
fn test_restart_keeps_best_score() {
    let mut engine = engine_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], 40);
    engine.move_tiles(Direction::Left);
    assert_eq!(engine.best_score(), 44);

    engine.restart();
    assert_eq!(engine.score(), 0);
    assert_eq!(engine.grid().tiles().count(), 2);
    assert_eq!(engine.best_score(), 44);
}

#[test]
fn test_strength_survives_reload() {
    let mut engine = GameEngine::with_rng(
        GameConfig::default(),
        MemoryStore::new(),
        StdRng::seed_from_u64(5),
    );
    engine.setup();
    engine.set_ai_strength(Strength::clamped(7));
    let score = engine.score();

    let backend = engine.persistence().backend().clone();
    let mut reloaded = GameEngine::new(GameConfig::default(), backend);
    assert_eq!(reloaded.setup(), Some(Strength::clamped(7)));
    assert_eq!(reloaded.score(), score);
    assert_eq!(reloaded.grid().for_oracle(), engine.grid().for_oracle());
}

#[test]
fn test_resumed_tiles_have_no_transient_data() {
    let mut engine = engine_with([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]], 0);
    engine.move_tiles(Direction::Left);

    let backend = engine.persistence().backend().clone();
    let mut reloaded = GameEngine::new(GameConfig::default(), backend);
    reloaded.setup();
    assert!(reloaded.grid().tiles().all(|tile| {
        tile.merged_from().is_none() && tile.previous_position().is_none()
    }));
}
