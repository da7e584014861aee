use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Instrument, PriceBar};

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("History request failed: {0}")]
    RequestFailed(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for MarketDataError {
    fn from(err: serde_json::Error) -> Self {
        MarketDataError::ParseError(err.to_string())
    }
}

/// Price bars per instrument, each series ordered oldest first
pub type PriceHistory = HashMap<Instrument, Vec<PriceBar>>;

/// Source of historical closes for warm-up
///
/// Implementations return up to `count` most recent bars for each requested
/// instrument. An instrument with no data may be missing from the map.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryPort: Send + Sync {
    async fn fetch_history(
        &self,
        instruments: &[Instrument],
        count: usize,
    ) -> Result<PriceHistory, MarketDataError>;
}
