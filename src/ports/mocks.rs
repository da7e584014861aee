use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use crate::domain::{Instrument, PriceBar, SignalGroup};
use crate::ports::market_data::{HistoryPort, MarketDataError, PriceHistory};
use crate::ports::signals::{SignalSink, SinkError};

/// In-memory history port that records requests and serves canned bars
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    calls: Arc<Mutex<Vec<(Vec<Instrument>, usize)>>>,
    bars: Arc<Mutex<PriceHistory>>,
}

impl StaticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the bars served for an instrument
    pub fn with_bars(self, instrument: impl Into<Instrument>, bars: Vec<PriceBar>) -> Self {
        self.bars.lock().unwrap().insert(instrument.into(), bars);
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<(Vec<Instrument>, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryPort for StaticHistory {
    async fn fetch_history(
        &self,
        instruments: &[Instrument],
        count: usize,
    ) -> Result<PriceHistory, MarketDataError> {
        self.calls.lock().unwrap().push((instruments.to_vec(), count));
        let bars = self.bars.lock().unwrap();
        Ok(instruments
            .iter()
            .filter_map(|id| {
                bars.get(id).map(|series| {
                    let skip = series.len().saturating_sub(count);
                    (id.clone(), series[skip..].to_vec())
                })
            })
            .collect())
    }
}

/// Signal sink that keeps every group it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    groups: Arc<Mutex<Vec<SignalGroup>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> Vec<SignalGroup> {
        self.groups.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.groups.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SignalSink for RecordingSink {
    fn on_signal_group(&mut self, group: &SignalGroup) -> Result<(), SinkError> {
        self.groups.lock().unwrap().push(group.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_static_history_serves_tail() {
        let t0 = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let bars: Vec<PriceBar> = (0..5).map(|h| PriceBar::new(t0 + Duration::hours(h), h as f64)).collect();
        let history = StaticHistory::new().with_bars("XOM", bars);

        let result = history
            .fetch_history(&["XOM".into(), "BP".into()], 3)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        let xom = &result[&Instrument::new("XOM")];
        assert_eq!(xom.iter().map(|b| b.price).collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(history.get_calls(), vec![(vec!["XOM".into(), "BP".into()], 3)]);
    }

    #[test]
    fn test_recording_sink_shares_state_across_clones() {
        let sink = RecordingSink::new();
        let mut handle = sink.clone();
        let group = SignalGroup::pair("XOM".into(), "BP".into(), Direction::Up, Utc::now(), Duration::hours(2));

        handle.on_signal_group(&group).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.groups()[0], group);
    }
}
