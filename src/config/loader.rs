//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/pairs.toml.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::domain::Instrument;
use crate::strategy::params::{
    self, StrategyConfig, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW, DEFAULT_SIGNAL_LIFESPAN_HOURS,
};

/// Main configuration structure matching config/pairs.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub pair: PairSection,
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// The manually selected pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSection {
    /// First leg (receives Up on an upper-band break)
    pub instrument_a: String,
    /// Second leg
    pub instrument_b: String,
}

impl PairSection {
    pub fn instruments(&self) -> (Instrument, Instrument) {
        (
            Instrument::new(self.instrument_a.clone()),
            Instrument::new(self.instrument_b.clone()),
        )
    }
}

/// Strategy configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySection {
    /// Price-spread window capacity (bars)
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    /// Volume-spread window capacity (bars)
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    /// Signal lifespan in hours
    #[serde(default = "default_lifespan_hours")]
    pub signal_lifespan_hours: i64,
    /// History bars requested for warm-up (defaults to short_window)
    #[serde(default)]
    pub history_bars: Option<usize>,
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            signal_lifespan_hours: DEFAULT_SIGNAL_LIFESPAN_HOURS,
            history_bars: None,
        }
    }
}

impl StrategySection {
    pub fn history_bars(&self) -> usize {
        self.history_bars.unwrap_or(self.short_window)
    }
}

fn default_short_window() -> usize {
    DEFAULT_SHORT_WINDOW
}

fn default_long_window() -> usize {
    DEFAULT_LONG_WINDOW
}

fn default_lifespan_hours() -> i64 {
    DEFAULT_SIGNAL_LIFESPAN_HOURS
}

/// Logging configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid strategy parameters: {0}")]
    InvalidStrategy(#[from] params::ConfigError),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pair.instrument_a.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "instrument_a cannot be empty".to_string(),
            ));
        }

        if self.pair.instrument_b.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "instrument_b cannot be empty".to_string(),
            ));
        }

        if self.pair.instrument_a == self.pair.instrument_b {
            return Err(ConfigError::ValidationError(format!(
                "instrument_a and instrument_b must differ, both are {}",
                self.pair.instrument_a
            )));
        }

        if self.strategy.history_bars == Some(0) {
            return Err(ConfigError::ValidationError(
                "history_bars must be > 0".to_string(),
            ));
        }

        StrategyConfig::from(self).validate()?;
        Ok(())
    }
}

// Conversion from Config to StrategyConfig
impl From<&Config> for StrategyConfig {
    fn from(config: &Config) -> Self {
        StrategyConfig {
            short_window: config.strategy.short_window,
            long_window: config.strategy.long_window,
            signal_lifespan_minutes: config.strategy.signal_lifespan_hours.saturating_mul(60),
        }
    }
}
