//! League configuration.
//!
//! Values come from an optional TOML file, then environment overrides
//! (`STRICTLY_LEAGUE_DATABASE_URL`, `STRICTLY_LEAGUE_MAX_BOARD_SIZE`).

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding the database path.
pub const DATABASE_URL_ENV: &str = "STRICTLY_LEAGUE_DATABASE_URL";
/// Environment variable overriding the largest allowed board.
pub const MAX_BOARD_SIZE_ENV: &str = "STRICTLY_LEAGUE_MAX_BOARD_SIZE";
/// Largest `max_board_size` accepted; its square still fits an `i32` column.
pub const BOARD_SIZE_LIMIT: usize = 46_340;

/// Runtime settings for the league service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct LeagueConfig {
    /// SQLite database path.
    #[setters(into)]
    database_url: String,

    /// Board size used when a session is created without one.
    default_board_size: usize,

    /// Largest board a session may use.
    max_board_size: usize,

    /// Buffered events per subscriber before the slowest one lags.
    event_capacity: usize,

    /// How long a connection waits for a competing writer.
    busy_timeout_ms: u64,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            database_url: "strictly_league.db".to_string(),
            default_board_size: 3,
            max_board_size: 15,
            event_capacity: 64,
            busy_timeout_ms: 5000,
        }
    }
}

impl LeagueConfig {
    /// Loads configuration from a TOML file; missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or
    /// the values are out of range.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(database_url = %config.database_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `.env`, the optional file, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unreadable file or a malformed override.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!(error = %e, "No .env file loaded");
        }

        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides looked up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override does not parse or is out of range.
    #[instrument(skip(self, lookup))]
    pub fn apply_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(DATABASE_URL_ENV) {
            debug!(%url, "Database path from environment");
            self.database_url = url;
        }
        if let Some(raw) = lookup(MAX_BOARD_SIZE_ENV) {
            self.max_board_size = raw.trim().parse().map_err(|_| {
                ConfigError::new(format!("{} must be a positive integer, got '{}'", MAX_BOARD_SIZE_ENV, raw))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::new("database_url must not be empty".to_string()));
        }
        if self.max_board_size == 0 || self.max_board_size > BOARD_SIZE_LIMIT {
            warn!(max = self.max_board_size, "Max board size out of range");
            return Err(ConfigError::new(format!(
                "max_board_size must be within 1..={}, got {}",
                BOARD_SIZE_LIMIT, self.max_board_size
            )));
        }
        if self.default_board_size == 0 || self.default_board_size > self.max_board_size {
            warn!(
                default = self.default_board_size,
                max = self.max_board_size,
                "Default board size out of range"
            );
            return Err(ConfigError::new(format!(
                "default_board_size must be within 1..={}, got {}",
                self.max_board_size, self.default_board_size
            )));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::new("event_capacity must be at least 1".to_string()));
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
