//! JSON-lines tick feed
//!
//! One event per line, `#` comments and blank lines ignored:
//!
//! ```text
//! {"type":"pair","instrument_a":"XOM","instrument_b":"BP"}
//! {"type":"tick","instrument":"XOM","timestamp":"2019-06-03T14:00:00Z","price":80.2,"volume":1200}
//! {"type":"tick","instrument":"BP","timestamp":"2019-06-03T14:00:00Z","price":38.9,"volume":900}
//! ```
//!
//! Consecutive ticks sharing a timestamp are grouped into one slice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::domain::{Instrument, Observation};
use crate::ports::market_data::MarketDataError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub instrument: Instrument,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: f64,
}

impl TickRecord {
    pub fn into_parts(self) -> (Instrument, Observation) {
        (
            self.instrument,
            Observation::new(self.timestamp, self.price, self.volume),
        )
    }
}

/// One line of the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    Tick(TickRecord),
    Pair {
        instrument_a: Instrument,
        instrument_b: Instrument,
    },
}

/// What the consumer should process next
#[derive(Debug, Clone, PartialEq)]
pub enum FeedBatch {
    PairAssigned {
        instrument_a: Instrument,
        instrument_b: Instrument,
    },
    Slice(Vec<(Instrument, Observation)>),
}

pub struct TickFeed<R> {
    lines: Lines<R>,
    pending: Option<FeedEvent>,
    line_no: usize,
}

impl<R: AsyncBufRead + Unpin> TickFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            pending: None,
            line_no: 0,
        }
    }

    /// Next pair event or same-timestamp slice, `None` at end of input
    pub async fn next_batch(&mut self) -> Result<Option<FeedBatch>, MarketDataError> {
        let first = match self.pending.take() {
            Some(event) => event,
            None => match self.next_event().await? {
                Some(event) => event,
                None => return Ok(None),
            },
        };

        match first {
            FeedEvent::Pair {
                instrument_a,
                instrument_b,
            } => Ok(Some(FeedBatch::PairAssigned {
                instrument_a,
                instrument_b,
            })),
            FeedEvent::Tick(tick) => {
                let timestamp = tick.timestamp;
                let mut slice = vec![tick.into_parts()];
                loop {
                    match self.next_event().await? {
                        Some(FeedEvent::Tick(next)) if next.timestamp == timestamp => {
                            slice.push(next.into_parts());
                        }
                        Some(other) => {
                            self.pending = Some(other);
                            break;
                        }
                        None => break,
                    }
                }
                Ok(Some(FeedBatch::Slice(slice)))
            }
        }
    }

    async fn next_event(&mut self) -> Result<Option<FeedEvent>, MarketDataError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let event = serde_json::from_str(line).map_err(|e| {
                MarketDataError::ParseError(format!("line {}: {}", self.line_no, e))
            })?;
            return Ok(Some(event));
        }
        Ok(None)
    }
}
