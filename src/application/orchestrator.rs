//! Signal Orchestrator
//!
//! Drives the decision engine from external events: pair assignments
//! (fetch history, replay, activate) and ticks (evaluate, deliver any
//! signal group to the sink). Events are processed one at a time.

use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncBufRead;

use crate::adapters::feed::{FeedBatch, TickFeed};
use crate::domain::{Instrument, Observation};
use crate::ports::market_data::{HistoryPort, MarketDataError};
use crate::ports::signals::{SignalSink, SinkError};
use crate::strategy::params::ConfigError;
use crate::strategy::{DecisionEngine, EngineError, EngineSnapshot, StrategyConfig, TickOutcome, WarmupReport};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Signal delivery error: {0}")]
    Sink(#[from] SinkError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Status snapshot of the orchestrator
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    pub engine: EngineSnapshot,
    pub batches_processed: u64,
    pub groups_emitted: u64,
    pub pair_assignments: u64,
}

/// Owns the engine and its two collaborators
pub struct SignalOrchestrator<H, S> {
    engine: DecisionEngine,
    history: H,
    sink: S,
    batches_processed: u64,
    groups_emitted: u64,
    pair_assignments: u64,
}

impl<H: HistoryPort, S: SignalSink> SignalOrchestrator<H, S> {
    pub fn new(config: StrategyConfig, history: H, sink: S) -> Result<Self, OrchestratorError> {
        Ok(Self {
            engine: DecisionEngine::new(config)?,
            history,
            sink,
            batches_processed: 0,
            groups_emitted: 0,
            pair_assignments: 0,
        })
    }

    /// Set the number of history bars requested on warm-up
    pub fn with_history_bars(mut self, bars: usize) -> Self {
        self.engine = self.engine.with_history_bars(bars);
        self
    }

    /// Reset onto a new pair and warm up from history.
    ///
    /// A history failure is returned as-is and leaves the engine in
    /// `WarmingUp`, so no signal can be produced until a later assignment
    /// succeeds.
    pub async fn assign_pair(
        &mut self,
        instrument_a: Instrument,
        instrument_b: Instrument,
    ) -> Result<WarmupReport, OrchestratorError> {
        let ticket = self.engine.assign_pair(instrument_a, instrument_b)?;
        self.pair_assignments += 1;

        let history = match self.history.fetch_history(&ticket.instruments(), ticket.bars).await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(
                    "History fetch for {}/{} failed, staying in warm-up: {}",
                    ticket.instrument_a,
                    ticket.instrument_b,
                    e
                );
                return Err(e.into());
            }
        };

        let empty = Vec::new();
        let bars_a = history.get(&ticket.instrument_a).unwrap_or(&empty);
        let bars_b = history.get(&ticket.instrument_b).unwrap_or(&empty);
        if bars_a.is_empty() || bars_b.is_empty() {
            tracing::warn!(
                "Warm-up history incomplete: {} has {} bars, {} has {} bars",
                ticket.instrument_a,
                bars_a.len(),
                ticket.instrument_b,
                bars_b.len()
            );
        }

        Ok(self.engine.complete_warmup(&ticket, bars_a, bars_b)?)
    }

    /// Process a single observation
    pub fn on_tick(
        &mut self,
        instrument: &Instrument,
        observation: Observation,
    ) -> Result<TickOutcome, OrchestratorError> {
        let outcome = self.engine.on_tick(instrument, observation);
        self.deliver(&outcome)?;
        Ok(outcome)
    }

    /// Process all observations of one time slice
    pub fn on_slice(
        &mut self,
        observations: &[(Instrument, Observation)],
    ) -> Result<TickOutcome, OrchestratorError> {
        let outcome = self.engine.on_slice(observations);
        self.deliver(&outcome)?;
        Ok(outcome)
    }

    /// Consume a tick feed until it ends
    pub async fn run_feed<R>(&mut self, feed: &mut TickFeed<R>) -> Result<OrchestratorStatus, OrchestratorError>
    where
        R: AsyncBufRead + Unpin,
    {
        while let Some(batch) = feed.next_batch().await? {
            match batch {
                FeedBatch::PairAssigned {
                    instrument_a,
                    instrument_b,
                } => {
                    self.assign_pair(instrument_a, instrument_b).await?;
                }
                FeedBatch::Slice(observations) => {
                    self.on_slice(&observations)?;
                }
            }
        }
        Ok(self.status())
    }

    fn deliver(&mut self, outcome: &TickOutcome) -> Result<(), SinkError> {
        self.batches_processed += 1;
        match outcome {
            TickOutcome::Emitted { group, .. } => {
                self.sink.on_signal_group(group)?;
                self.groups_emitted += 1;
            }
            TickOutcome::Skipped(reason) => {
                tracing::debug!("Tick skipped: {:?}", reason);
            }
            TickOutcome::InsufficientData(missing) => {
                tracing::debug!("No decision: {}", missing);
            }
            TickOutcome::NoSignal(_) => {}
        }
        Ok(())
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn status(&self) -> OrchestratorStatus {
        OrchestratorStatus {
            engine: self.engine.snapshot(),
            batches_processed: self.batches_processed,
            groups_emitted: self.groups_emitted,
            pair_assignments: self.pair_assignments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;
    use crate::ports::market_data::{MockHistoryPort, PriceHistory};
    use crate::ports::mocks::{RecordingSink, StaticHistory};
    use crate::strategy::EngineState;
    use chrono::{Duration, TimeZone, Utc};
    use tokio::io::BufReader;

    fn small_config() -> StrategyConfig {
        StrategyConfig::default()
            .with_short_window(3)
            .with_long_window(3)
    }

    fn history_bars(prices: &[f64]) -> Vec<PriceBar> {
        let t0 = Utc.with_ymd_and_hms(2019, 5, 1, 0, 0, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PriceBar::new(t0 + Duration::hours(i as i64), p))
            .collect()
    }

    #[tokio::test]
    async fn test_history_failure_blocks_activation() {
        let mut history = MockHistoryPort::new();
        history
            .expect_fetch_history()
            .times(1)
            .returning(|_, _| Err(MarketDataError::RequestFailed("timeout".into())));

        let mut orchestrator = SignalOrchestrator::new(small_config(), history, RecordingSink::new()).unwrap();
        let result = orchestrator.assign_pair("XOM".into(), "BP".into()).await;

        assert!(matches!(
            result,
            Err(OrchestratorError::MarketData(MarketDataError::RequestFailed(ref msg))) if msg == "timeout"
        ));
        assert_eq!(orchestrator.engine().state(), Some(EngineState::WarmingUp));
    }

    #[tokio::test]
    async fn test_requests_short_window_history_for_both_legs() {
        let mut history = MockHistoryPort::new();
        history.expect_fetch_history().times(1).returning(|instruments, count| {
            assert_eq!(instruments, &[Instrument::new("XOM"), Instrument::new("BP")]);
            assert_eq!(count, 3);
            let mut result = PriceHistory::new();
            result.insert("XOM".into(), history_bars(&[10.0, 10.0, 10.0]));
            result.insert("BP".into(), history_bars(&[11.0, 12.0, 13.0]));
            Ok(result)
        });

        let mut orchestrator = SignalOrchestrator::new(small_config(), history, RecordingSink::new()).unwrap();
        let report = orchestrator.assign_pair("XOM".into(), "BP".into()).await.unwrap();

        assert_eq!(report.replayed, 3);
        assert!(orchestrator.engine().is_active());
    }

    #[tokio::test]
    async fn test_missing_series_warms_up_empty() {
        let history = StaticHistory::new().with_bars("XOM", history_bars(&[1.0, 2.0]));
        let mut orchestrator = SignalOrchestrator::new(small_config(), history, RecordingSink::new()).unwrap();

        let report = orchestrator.assign_pair("XOM".into(), "BP".into()).await.unwrap();

        assert_eq!(report.replayed, 0);
        assert!(orchestrator.engine().is_active());
        assert!(orchestrator.engine().short_window().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_bars_override() {
        let history = StaticHistory::new();
        let mut orchestrator = SignalOrchestrator::new(small_config(), history.clone(), RecordingSink::new())
            .unwrap()
            .with_history_bars(7);

        orchestrator.assign_pair("XOM".into(), "BP".into()).await.unwrap();
        assert_eq!(history.get_calls()[0].1, 7);
    }

    #[tokio::test]
    async fn test_run_feed_delivers_groups() {
        let history = StaticHistory::new()
            .with_bars("XOM", history_bars(&[10.0, 10.0, 10.0]))
            .with_bars("BP", history_bars(&[10.0, 10.0, 11.0]));
        let sink = RecordingSink::new();
        let mut orchestrator = SignalOrchestrator::new(small_config(), history, sink.clone()).unwrap();

        let feed = r#"
{"type":"pair","instrument_a":"XOM","instrument_b":"BP"}
{"type":"tick","instrument":"XOM","timestamp":"2019-06-03T14:00:00Z","price":10.0,"volume":50}
{"type":"tick","instrument":"BP","timestamp":"2019-06-03T14:00:00Z","price":10.0,"volume":50}
{"type":"tick","instrument":"XOM","timestamp":"2019-06-03T15:00:00Z","price":10.0,"volume":60}
{"type":"tick","instrument":"BP","timestamp":"2019-06-03T15:00:00Z","price":10.0,"volume":60}
{"type":"tick","instrument":"XOM","timestamp":"2019-06-03T16:00:00Z","price":10.0,"volume":40}
{"type":"tick","instrument":"BP","timestamp":"2019-06-03T16:00:00Z","price":10.0,"volume":40}
{"type":"tick","instrument":"XOM","timestamp":"2019-06-03T17:00:00Z","price":10.0,"volume":60}
{"type":"tick","instrument":"BP","timestamp":"2019-06-03T17:00:00Z","price":15.0,"volume":60}
"#;
        let mut ticks = TickFeed::new(BufReader::new(feed.as_bytes()));
        let status = orchestrator.run_feed(&mut ticks).await.unwrap();

        assert_eq!(status.pair_assignments, 1);
        assert_eq!(status.batches_processed, 4);
        assert_eq!(status.groups_emitted, 1);

        let groups = sink.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].to_string(), "[XOM: Up, BP: Down]");
    }
}
