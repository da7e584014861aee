//! Strategy Layer - Pairs spread statistics and decisioning
//!
//! - Rolling mean / population std over fixed-capacity windows
//! - Damped price spread and summed volume of the latest paired observation
//! - Warm-up replay of aligned history into the short window
//! - Asymmetric band rule producing paired Up/Down signals
//!
//! Two windows per pair: a short one over the price spread and a long one
//! over the volume spread. Both are rebuilt from scratch on every pair
//! assignment.

pub mod params;
pub mod rolling_stats;
pub mod spread;
pub mod warmup;
pub mod engine;

pub use params::{StrategyConfig, ConfigError};
pub use rolling_stats::{RollingStatistic, WindowStats, InsufficientData};
pub use spread::{Spread, SpreadCalculator};
pub use warmup::{align_history, AlignedPrice, WarmupLoader, WarmupReport};
pub use engine::{
    DecisionEngine, EngineError, EngineSnapshot, EngineState, Evaluation, SkipReason, Thresholds,
    TickOutcome, WarmupTicket,
};
