//! Ports Layer - Trait definitions for external collaborators
//!
//! Following hexagonal architecture, these traits abstract:
//! - Historical price retrieval for warm-up
//! - Delivery of emitted signal groups

pub mod market_data;
pub mod signals;
pub mod mocks;

pub use market_data::{HistoryPort, MarketDataError, PriceHistory};
pub use signals::{SignalSink, SinkError};
pub use mocks::{RecordingSink, StaticHistory};
