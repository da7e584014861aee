//! Warm-up Replay
//!
//! Seeds the short (price) window from history before live decisioning.
//! The two price series are joined on timestamp, and each aligned row
//! contributes `price_b - price_a` in chronological order. The replayed
//! difference is undamped, unlike the live path, and the long (volume)
//! window is left empty.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::PriceBar;
use crate::strategy::rolling_stats::RollingStatistic;
use crate::strategy::spread::SpreadCalculator;

/// Prices of both legs at one shared timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPrice {
    pub timestamp: DateTime<Utc>,
    pub price_a: f64,
    pub price_b: f64,
}

/// Inner join of two price series on timestamp, oldest first.
///
/// Timestamps present in only one series are dropped. A duplicated
/// timestamp within one series keeps its last bar.
pub fn align_history(history_a: &[PriceBar], history_b: &[PriceBar]) -> Vec<AlignedPrice> {
    let a: BTreeMap<DateTime<Utc>, f64> = history_a.iter().map(|bar| (bar.timestamp, bar.price)).collect();
    let b: BTreeMap<DateTime<Utc>, f64> = history_b.iter().map(|bar| (bar.timestamp, bar.price)).collect();

    a.into_iter()
        .filter_map(|(timestamp, price_a)| {
            b.get(&timestamp).map(|&price_b| AlignedPrice {
                timestamp,
                price_a,
                price_b,
            })
        })
        .collect()
}

/// Outcome of one replay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WarmupReport {
    /// Aligned rows fed into the short window
    pub replayed: usize,
    /// Bars that found no partner timestamp, priced a non-finite spread, or
    /// fell outside the replay length
    pub dropped: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

/// Replays aligned history into the short window
#[derive(Debug, Clone, Copy)]
pub struct WarmupLoader {
    bars: usize,
}

impl WarmupLoader {
    /// `bars` is both the history length requested and the replay cap
    pub fn new(bars: usize) -> Self {
        Self { bars }
    }

    pub fn bars(&self) -> usize {
        self.bars
    }

    /// Feed the most recent `bars` finite aligned differences into `short`, oldest first
    pub fn replay(
        &self,
        history_a: &[PriceBar],
        history_b: &[PriceBar],
        short: &mut RollingStatistic,
    ) -> WarmupReport {
        let aligned = align_history(history_a, history_b);
        let total = aligned.len();
        let finite: Vec<(DateTime<Utc>, f64)> = aligned
            .into_iter()
            .map(|row| (row.timestamp, SpreadCalculator::replay(row.price_a, row.price_b)))
            .filter(|(_, spread)| spread.is_finite())
            .collect();
        if finite.len() < total {
            tracing::warn!("Skipping {} history rows with a non-finite spread", total - finite.len());
        }

        let skip = finite.len().saturating_sub(self.bars);
        let rows = &finite[skip..];
        for &(_, spread) in rows {
            short.update(spread);
        }

        WarmupReport {
            replayed: rows.len(),
            dropped: history_a.len() + history_b.len() - 2 * rows.len(),
            first: rows.first().map(|&(timestamp, _)| timestamp),
            last: rows.last().map(|&(timestamp, _)| timestamp),
        }
    }
}
