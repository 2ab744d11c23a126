//! Game rule configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Tunable game rules.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct GameConfig {
    /// Cells per side.
    #[serde(default = "default_grid_size")]
    grid_size: usize,

    /// Tiles spawned when a fresh game is set up.
    #[serde(default = "default_start_tiles")]
    start_tiles: usize,

    /// Merging into a tile of this value wins the game.
    #[serde(default = "default_win_value")]
    win_value: u32,

    /// Chance that a spawned tile is a 4 rather than a 2.
    #[serde(default = "default_four_probability")]
    four_probability: f64,
}

fn default_grid_size() -> usize {
    4
}

fn default_start_tiles() -> usize {
    2
}

fn default_win_value() -> u32 {
    65536
}

fn default_four_probability() -> f64 {
    0.1
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            start_tiles: default_start_tiles(),
            win_value: default_win_value(),
            four_probability: default_four_probability(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file and validates it.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading game config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text and validates it.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        info!(grid_size = config.grid_size, win_value = config.win_value, "Game config loaded");
        Ok(config)
    }

    /// Checks that the rules describe a playable game.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::new(format!(
                "grid_size must be at least 2, got {}",
                self.grid_size
            )));
        }
        if self.start_tiles > self.grid_size * self.grid_size {
            return Err(ConfigError::new(format!(
                "start_tiles ({}) exceeds cell count ({})",
                self.start_tiles,
                self.grid_size * self.grid_size
            )));
        }
        if self.win_value < 4 || !self.win_value.is_power_of_two() {
            return Err(ConfigError::new(format!(
                "win_value must be a power of two of at least 4, got {}",
                self.win_value
            )));
        }
        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(ConfigError::new(format!(
                "four_probability must lie in [0, 1], got {}",
                self.four_probability
            )));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
