//! Strategy Parameters
//!
//! Window sizes and signal lifespan are configurable. The threshold
//! coefficients and the price-spread dampening are fixed.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Upper band on the short window: mean + 1.0 * std
pub const SHORT_UPPER_COEFF: f64 = 1.0;
/// Lower band on the short window: mean - 2.0 * std (asymmetric on purpose)
pub const SHORT_LOWER_COEFF: f64 = 2.0;
/// Lower band on the long (volume) window: mean - 1.0 * std
pub const LONG_LOWER_COEFF: f64 = 1.0;
/// Multiplier applied to the live price spread
pub const PRICE_SPREAD_DAMPENING: f64 = 0.9;

pub const DEFAULT_SHORT_WINDOW: usize = 500;
pub const DEFAULT_LONG_WINDOW: usize = 2500;
pub const DEFAULT_SIGNAL_LIFESPAN_HOURS: i64 = 2;

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Capacity of the price-spread window (also the warm-up history length)
    pub short_window: usize,
    /// Capacity of the volume-spread window
    pub long_window: usize,
    /// How long an emitted signal stays valid, in minutes
    pub signal_lifespan_minutes: i64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            signal_lifespan_minutes: DEFAULT_SIGNAL_LIFESPAN_HOURS * 60,
        }
    }
}

impl StrategyConfig {
    pub fn with_short_window(mut self, capacity: usize) -> Self {
        self.short_window = capacity;
        self
    }

    pub fn with_long_window(mut self, capacity: usize) -> Self {
        self.long_window = capacity;
        self
    }

    pub fn with_lifespan(mut self, lifespan: Duration) -> Self {
        self.signal_lifespan_minutes = lifespan.num_minutes();
        self
    }

    pub fn signal_lifespan(&self) -> Duration {
        Duration::minutes(self.signal_lifespan_minutes)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.short_window == 0 {
            return Err(ConfigError::InvalidWindow {
                window: "short",
                capacity: self.short_window,
            });
        }
        if self.long_window == 0 {
            return Err(ConfigError::InvalidWindow {
                window: "long",
                capacity: self.long_window,
            });
        }
        if self.signal_lifespan_minutes <= 0 {
            return Err(ConfigError::InvalidLifespan(self.signal_lifespan_minutes));
        }
        Ok(())
    }
}

/// Configuration validation errors, raised at construction only
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {window} window capacity: {capacity} (must be > 0)")]
    InvalidWindow { window: &'static str, capacity: usize },
    #[error("Invalid signal lifespan: {0} minutes (must be > 0)")]
    InvalidLifespan(i64),
}
