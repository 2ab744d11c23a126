//! Session configuration.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strictly_2048::{ConfigError, GameConfig, MAX_STRENGTH, MIN_STRENGTH};
use tracing::{debug, info, instrument};

/// Autoplay pacing, oracle limits, storage location, and the game rules.
///
/// ```toml
/// move_cadence_ms = 100
/// oracle_timeout_ms = 10000
/// initial_strength = 3
/// database_path = "2048.db"
///
/// [game]
/// win_value = 2048
/// ```
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct AutoplayConfig {
    /// Minimum time between issuing an oracle request and applying its move.
    #[serde(default = "default_move_cadence_ms")]
    move_cadence_ms: u64,

    /// How long to wait for an oracle reply.
    #[serde(default = "default_oracle_timeout_ms")]
    oracle_timeout_ms: u64,

    /// Strength used when no saved game supplies one.
    #[serde(default = "default_initial_strength")]
    initial_strength: u8,

    /// SQLite file for persistence; in-memory storage when absent.
    #[serde(default)]
    database_path: Option<String>,

    /// Game rules.
    #[serde(default)]
    game: GameConfig,
}

fn default_move_cadence_ms() -> u64 {
    100
}

fn default_oracle_timeout_ms() -> u64 {
    10_000
}

fn default_initial_strength() -> u8 {
    3
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            move_cadence_ms: default_move_cadence_ms(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            initial_strength: default_initial_strength(),
            database_path: None,
            game: GameConfig::default(),
        }
    }
}

impl AutoplayConfig {
    /// Loads configuration from a TOML file and validates it.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading autoplay config from file");
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
        info!(
            cadence_ms = config.move_cadence_ms,
            timeout_ms = config.oracle_timeout_ms,
            "Autoplay config loaded"
        );
        Ok(config)
    }

    /// Validates the session settings and the nested game rules.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle_timeout_ms == 0 {
            return Err(ConfigError::new("oracle_timeout_ms must be positive".to_string()));
        }
        if !(MIN_STRENGTH..=MAX_STRENGTH).contains(&self.initial_strength) {
            return Err(ConfigError::new(format!(
                "initial_strength must lie in [{}, {}], got {}",
                MIN_STRENGTH, MAX_STRENGTH, self.initial_strength
            )));
        }
        self.game.validate()
    }

    /// Move cadence as a duration.
    pub fn move_cadence(&self) -> Duration {
        Duration::from_millis(self.move_cadence_ms)
    }

    /// Oracle timeout as a duration.
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_millis(self.oracle_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AutoplayConfig::from_toml("").expect("defaults");
        assert_eq!(config, AutoplayConfig::default());
        assert_eq!(config.move_cadence(), Duration::from_millis(100));
        assert_eq!(config.oracle_timeout(), Duration::from_secs(10));
        assert_eq!(*config.database_path(), None);
    }

    #[test]
    fn test_nested_game_table() {
        let config = AutoplayConfig::from_toml(
            "move_cadence_ms = 250\ndatabase_path = \"games.db\"\n\n[game]\nwin_value = 2048\n",
        )
        .expect("parse");
        assert_eq!(*config.move_cadence_ms(), 250);
        assert_eq!(config.database_path().as_deref(), Some("games.db"));
        assert_eq!(*config.game().win_value(), 2048);
        assert_eq!(*config.game().grid_size(), 4);
    }

    #[test]
    fn test_nested_game_is_validated() {
        assert!(AutoplayConfig::from_toml("[game]\ngrid_size = 1\n").is_err());
    }

    #[test]
    fn test_rejects_zero_timeout_and_bad_strength() {
        assert!(AutoplayConfig::from_toml("oracle_timeout_ms = 0").is_err());
        assert!(AutoplayConfig::from_toml("initial_strength = 9").is_err());
        assert!(AutoplayConfig::from_toml("initial_strength = 0").is_err());
    }

    #[test]
    fn test_from_file() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        std::fs::write(file.path(), "initial_strength = 5\n").expect("write");
        let config = AutoplayConfig::from_file(file.path()).expect("load");
        assert_eq!(*config.initial_strength(), 5);
    }
}
