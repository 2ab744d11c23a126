//! The game state machine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

use crate::invariants::assert_invariants;
use crate::storage::{KeyValueStore, PersistenceStore};
use crate::{Direction, GameConfig, GamePhase, GameState, Grid, Position, Strength, Tile, rules};

/// What a call to [`GameEngine::move_tiles`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The game does not accept moves in its current phase.
    Ignored,
    /// Nothing could slide or merge that way. No tile was spawned and
    /// nothing was persisted.
    Blocked,
    /// Tiles moved, a tile was spawned, and the state was persisted.
    Moved {
        /// Points earned by merges in this move.
        score_gained: u32,
    },
}

impl MoveOutcome {
    /// Whether the board changed.
    pub fn moved(self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Owns the grid, score, and end-of-game flags, and keeps the persisted
/// copy in step with them.
///
/// Every mutation persists before returning, so the stored copy is never
/// behind what a caller can observe.
#[derive(Debug)]
pub struct GameEngine<S> {
    config: GameConfig,
    store: PersistenceStore<S>,
    rng: StdRng,
    grid: Grid,
    score: u32,
    over: bool,
    won: bool,
    keep_playing: bool,
    ai_strength: Strength,
    started: bool,
}

impl<S: KeyValueStore> GameEngine<S> {
    /// Creates an engine in the setup phase with an entropy-seeded RNG.
    #[instrument(skip(backend))]
    pub fn new(config: GameConfig, backend: S) -> Self {
        Self::with_rng(config, backend, StdRng::from_entropy())
    }

    /// Creates an engine with a caller-supplied RNG.
    #[instrument(skip(backend, rng))]
    pub fn with_rng(config: GameConfig, backend: S, rng: StdRng) -> Self {
        let grid = Grid::new(*config.grid_size());
        Self {
            config,
            store: PersistenceStore::new(backend),
            rng,
            grid,
            score: 0,
            over: false,
            won: false,
            keep_playing: false,
            ai_strength: Strength::default(),
            started: false,
        }
    }

    /// Resumes the saved game if there is one, otherwise starts fresh.
    ///
    /// Returns the oracle strength stored with a resumed game so the
    /// controller can adopt it.
    #[instrument(skip(self))]
    pub fn setup(&mut self) -> Option<Strength> {
        let restored = self.store.load_game().and_then(|state| {
            match Grid::restore(state.grid()) {
                Some(grid) if grid.size() == *self.config.grid_size() => Some((state, grid)),
                Some(grid) => {
                    warn!(
                        saved = grid.size(),
                        configured = self.config.grid_size(),
                        "Saved game has a different grid size; starting fresh"
                    );
                    None
                }
                None => None,
            }
        });

        self.started = true;
        let resumed_strength = match restored {
            Some((state, grid)) => {
                self.grid = grid;
                self.score = *state.score();
                self.over = *state.over();
                self.won = *state.won();
                self.keep_playing = *state.keep_playing();
                self.ai_strength = *state.ai_strength();
                info!(score = self.score, phase = %self.phase(), "Resumed saved game");
                Some(self.ai_strength)
            }
            None => {
                self.start_fresh();
                None
            }
        };

        self.persist();
        resumed_strength
    }

    /// Throws away the current game and starts a new one.
    #[instrument(skip(self))]
    pub fn restart(&mut self) {
        info!(score = self.score, "Restarting game");
        if let Err(e) = self.store.clear_game() {
            warn!(error = %e, "Failed to clear saved game");
        }
        self.started = true;
        self.start_fresh();
        self.persist();
    }

    /// Continues play after a win.
    #[instrument(skip(self))]
    pub fn keep_playing(&mut self) {
        if !self.won || self.keep_playing {
            debug!("Nothing to continue");
            return;
        }
        info!("Continuing after win");
        self.keep_playing = true;
        self.persist();
    }

    /// Records the oracle strength so it is saved with the game.
    #[instrument(skip(self))]
    pub fn set_ai_strength(&mut self, strength: Strength) {
        self.ai_strength = strength;
        if self.started {
            self.persist();
        }
    }

    /// Slides all tiles in `direction`.
    ///
    /// On a real move a random tile is spawned, the game-over check runs,
    /// and the state is persisted.
    #[instrument(skip(self), fields(phase = %self.phase()))]
    pub fn move_tiles(&mut self, direction: Direction) -> MoveOutcome {
        if !self.phase().accepts_moves() {
            debug!("Move ignored");
            return MoveOutcome::Ignored;
        }

        let resolution = rules::resolve_move(&mut self.grid, direction, *self.config.win_value());
        assert_invariants(&self.grid);

        if !resolution.moved {
            debug!("Direction blocked");
            return MoveOutcome::Blocked;
        }

        self.score += resolution.score_gained;
        if resolution.reached_win_value && !self.won {
            info!(score = self.score, "Win value reached");
            self.won = true;
        }

        self.spawn_random_tile();

        if !self.moves_available() {
            info!(score = self.score, "No moves remain");
            self.over = true;
        }

        self.persist();
        MoveOutcome::Moved {
            score_gained: resolution.score_gained,
        }
    }

    /// Whether any move can change the grid.
    pub fn moves_available(&self) -> bool {
        rules::moves_available(&self.grid)
    }

    /// Directions that would move at least one tile right now.
    pub fn legal_directions(&self) -> Vec<Direction> {
        rules::legal_directions(&self.grid, *self.config.win_value())
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        GamePhase::from_flags(self.started, self.over, self.won, self.keep_playing)
    }

    /// Over, or won without continuing.
    pub fn is_terminated(&self) -> bool {
        self.phase().is_terminated()
    }

    /// The board.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Best score across games.
    pub fn best_score(&self) -> u32 {
        self.store.best_score()
    }

    /// No moves remain.
    pub fn is_over(&self) -> bool {
        self.over
    }

    /// The win value has been reached.
    pub fn is_won(&self) -> bool {
        self.won
    }

    /// The player chose to continue after winning.
    pub fn keep_playing_enabled(&self) -> bool {
        self.keep_playing
    }

    /// Strength saved with the game.
    pub fn ai_strength(&self) -> Strength {
        self.ai_strength
    }

    /// Rules in effect.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Persisted records.
    pub fn persistence(&self) -> &PersistenceStore<S> {
        &self.store
    }

    /// Serializable snapshot of the current game.
    pub fn state(&self) -> GameState {
        GameState::new(
            self.grid.serialize(),
            self.score,
            self.over,
            self.won,
            self.keep_playing,
            self.ai_strength,
        )
    }

    /// Empties the board, resets score and flags, and spawns the start tiles.
    fn start_fresh(&mut self) {
        self.grid = Grid::new(*self.config.grid_size());
        self.score = 0;
        self.over = false;
        self.won = false;
        self.keep_playing = false;

        for _ in 0..*self.config.start_tiles() {
            self.spawn_random_tile();
        }
        info!(tiles = self.config.start_tiles(), "Started fresh game");
    }

    /// Places a 2 or a 4 on a random empty cell.
    fn spawn_random_tile(&mut self) -> Option<Position> {
        let pos = self.grid.random_empty_position(&mut self.rng)?;
        let value = if self.rng.gen_range(0.0..1.0) < *self.config.four_probability() {
            4
        } else {
            2
        };
        debug!(at = %pos, value, "Spawned tile");
        self.grid.insert(Tile::new(pos, value));
        Some(pos)
    }

    /// Writes best score and the saved game. A finished game is cleared
    /// rather than saved so the next setup starts fresh.
    fn persist(&mut self) {
        if self.store.best_score() < self.score {
            if let Err(e) = self.store.set_best_score(self.score) {
                warn!(error = %e, "Failed to persist best score");
            }
        }

        let result = if self.over {
            self.store.clear_game()
        } else {
            self.store.save_game(self.state())
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist game state");
        }
    }
}
