//! Table configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest non-observer players needed to deal a hand.
pub const DEFAULT_MIN_PLAYERS: usize = 3;

/// Vaults (or alarms) that end a match.
pub const DEFAULT_MATCH_TARGET: u32 = 3;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse table config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid table config: {0}")]
    Invalid(String),
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Minimum non-observer players to start a hand (default: 3)
    pub min_players: usize,

    /// Vaults or alarms needed to end the match (default: 3)
    pub match_target: u32,

    /// Seed for reproducible shuffles; each hand advances it by one
    pub deck_seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            match_target: DEFAULT_MATCH_TARGET,
            deck_seed: None,
        }
    }
}

impl TableConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players < 2 {
            return Err(ConfigError::Invalid(
                "min_players must be at least 2".to_string(),
            ));
        }

        if self.match_target == 0 {
            return Err(ConfigError::Invalid(
                "match_target must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
