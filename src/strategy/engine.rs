//! Pairs Decision Engine
//!
//! State machine driven by two events:
//! - pair assignment: discards both windows, creates fresh ones and enters
//!   `WarmingUp`; the returned [`WarmupTicket`] must be redeemed with the
//!   fetched history to reach `Active`
//! - tick / slice: records observations and, when `Active` with both legs
//!   observed, updates both windows and evaluates the thresholds
//!
//! Decision rule, first match wins:
//! ```text
//! upper       = mean_short + 1.0 * std_short
//! lower_short = mean_short - 2.0 * std_short
//! lower_long  = mean_long  - 1.0 * std_long
//!
//! price > upper       && volume > lower_long  => [A: Up,   B: Down]
//! price < lower_short && volume > lower_long  => [A: Down, B: Up]
//! ```
//! Comparisons are strict, so a spread sitting exactly on a band emits nothing.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Direction, Instrument, Observation, PairState, PriceBar, SignalGroup};
use crate::strategy::params::{
    ConfigError, StrategyConfig, LONG_LOWER_COEFF, SHORT_LOWER_COEFF, SHORT_UPPER_COEFF,
};
use crate::strategy::rolling_stats::{InsufficientData, RollingStatistic, WindowStats};
use crate::strategy::spread::{Spread, SpreadCalculator};
use crate::strategy::warmup::{WarmupLoader, WarmupReport};

/// Lifecycle of the current pair assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    WarmingUp,
    Active,
}

/// Engine errors. Tick-level problems are never errors, see [`TickOutcome`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Pair legs must differ, got {0} twice")]
    DegeneratePair(Instrument),
    #[error("Stale warm-up for epoch {ticket} (current epoch {current:?})")]
    StaleWarmup { ticket: u64, current: Option<u64> },
    #[error("Warm-up for epoch {0} already completed")]
    AlreadyActive(u64),
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Claim on the warm-up of one specific pair assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmupTicket {
    epoch: u64,
    pub instrument_a: Instrument,
    pub instrument_b: Instrument,
    /// History length to request per instrument
    pub bars: usize,
}

impl WarmupTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn instruments(&self) -> [Instrument; 2] {
        [self.instrument_a.clone(), self.instrument_b.clone()]
    }
}

/// Band levels derived from the two windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub upper: f64,
    pub lower_short: f64,
    pub lower_long: f64,
}

impl Thresholds {
    pub fn from_stats(short: &WindowStats, long: &WindowStats) -> Self {
        Self {
            upper: short.mean + SHORT_UPPER_COEFF * short.std_dev,
            lower_short: short.mean - SHORT_LOWER_COEFF * short.std_dev,
            lower_long: long.mean - LONG_LOWER_COEFF * long.std_dev,
        }
    }

    /// Direction for leg A, if the spread breaks a band with enough volume
    pub fn decide(&self, spread: &Spread) -> Option<Direction> {
        if spread.price > self.upper && spread.volume > self.lower_long {
            Some(Direction::Up)
        } else if spread.price < self.lower_short && spread.volume > self.lower_long {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

/// Everything the decision looked at on one evaluated tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub at: DateTime<Utc>,
    pub price_spread: f64,
    pub volume_spread: f64,
    pub short: WindowStats,
    pub long: WindowStats,
    pub thresholds: Thresholds,
}

/// Why a tick produced no evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No pair has been assigned yet
    Unassigned,
    /// Instrument is not one of the tracked pair
    NotTracked,
    /// Replay has not completed for the current pair
    WarmingUp,
    /// One leg has no observation yet
    MissingLeg,
    /// Spread came out NaN or infinite
    NonFiniteSpread,
}

/// Result of feeding one tick or slice
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Skipped(SkipReason),
    /// Windows were updated but at least one is not full yet
    InsufficientData(InsufficientData),
    /// Evaluated, no band broken
    NoSignal(Evaluation),
    Emitted {
        group: SignalGroup,
        evaluation: Evaluation,
    },
}

impl TickOutcome {
    pub fn signal_group(&self) -> Option<&SignalGroup> {
        match self {
            TickOutcome::Emitted { group, .. } => Some(group),
            _ => None,
        }
    }

    pub fn into_signal_group(self) -> Option<SignalGroup> {
        match self {
            TickOutcome::Emitted { group, .. } => Some(group),
            _ => None,
        }
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        match self {
            TickOutcome::NoSignal(evaluation) | TickOutcome::Emitted { evaluation, .. } => Some(evaluation),
            _ => None,
        }
    }
}

/// Diagnostics view of the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub state: Option<EngineState>,
    pub epoch: u64,
    pub instrument_a: Option<Instrument>,
    pub instrument_b: Option<Instrument>,
    pub short_samples: usize,
    pub long_samples: usize,
    pub short: Option<WindowStats>,
    pub long: Option<WindowStats>,
}

/// Windows and state owned by one pair assignment
#[derive(Debug)]
struct Assignment {
    epoch: u64,
    state: EngineState,
    pair: PairState,
    short: RollingStatistic,
    long: RollingStatistic,
}

/// Per-pair statistics and threshold logic
#[derive(Debug)]
pub struct DecisionEngine {
    config: StrategyConfig,
    loader: WarmupLoader,
    lifespan: Duration,
    assignment: Option<Assignment>,
    next_epoch: u64,
}

impl DecisionEngine {
    pub fn new(config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            loader: WarmupLoader::new(config.short_window),
            lifespan: config.signal_lifespan(),
            config,
            assignment: None,
            next_epoch: 1,
        })
    }

    /// Override the history length replayed on warm-up (defaults to the short window)
    pub fn with_history_bars(mut self, bars: usize) -> Self {
        self.loader = WarmupLoader::new(bars);
        self
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Start tracking a pair. Any previous windows and pending warm-up are
    /// discarded, even when the same pair is assigned again.
    pub fn assign_pair(
        &mut self,
        instrument_a: Instrument,
        instrument_b: Instrument,
    ) -> Result<WarmupTicket, EngineError> {
        if instrument_a == instrument_b {
            return Err(EngineError::DegeneratePair(instrument_a));
        }

        let epoch = self.next_epoch;
        self.next_epoch += 1;

        let short = RollingStatistic::new(self.config.short_window)?;
        let long = RollingStatistic::new(self.config.long_window)?;

        if let Some(previous) = self.assignment.take() {
            if previous.pair.tracks(&instrument_a, &instrument_b) {
                tracing::info!(
                    "Pair {}/{} reassigned, discarding statistics (epoch {})",
                    instrument_a,
                    instrument_b,
                    epoch
                );
            } else {
                tracing::info!(
                    "Pair changed {}/{} -> {}/{}, discarding statistics (epoch {})",
                    previous.pair.instrument_a(),
                    previous.pair.instrument_b(),
                    instrument_a,
                    instrument_b,
                    epoch
                );
            }
        } else {
            tracing::info!("Pair assigned {}/{} (epoch {})", instrument_a, instrument_b, epoch);
        }

        self.assignment = Some(Assignment {
            epoch,
            state: EngineState::WarmingUp,
            pair: PairState::new(instrument_a.clone(), instrument_b.clone()),
            short,
            long,
        });

        Ok(WarmupTicket {
            epoch,
            instrument_a,
            instrument_b,
            bars: self.loader.bars(),
        })
    }

    /// Replay fetched history into the short window and go `Active`
    pub fn complete_warmup(
        &mut self,
        ticket: &WarmupTicket,
        history_a: &[PriceBar],
        history_b: &[PriceBar],
    ) -> Result<WarmupReport, EngineError> {
        let assignment = match self.assignment.as_mut() {
            Some(a) if a.epoch == ticket.epoch => a,
            other => {
                let current = other.map(|a| a.epoch);
                tracing::warn!("Discarding stale warm-up epoch {} (current {:?})", ticket.epoch, current);
                return Err(EngineError::StaleWarmup {
                    ticket: ticket.epoch,
                    current,
                });
            }
        };
        if assignment.state == EngineState::Active {
            return Err(EngineError::AlreadyActive(ticket.epoch));
        }

        let report = self.loader.replay(history_a, history_b, &mut assignment.short);
        assignment.state = EngineState::Active;

        tracing::info!(
            "Warm-up complete for {}/{}: {} rows replayed, {} bars dropped, short window {}/{}",
            assignment.pair.instrument_a(),
            assignment.pair.instrument_b(),
            report.replayed,
            report.dropped,
            assignment.short.len(),
            assignment.short.capacity()
        );
        Ok(report)
    }

    /// Feed one observation and evaluate
    pub fn on_tick(&mut self, instrument: &Instrument, observation: Observation) -> TickOutcome {
        let lifespan = self.lifespan;
        let Some(assignment) = self.assignment.as_mut() else {
            return skip(SkipReason::Unassigned);
        };
        if assignment.pair.record(instrument, observation).is_none() {
            tracing::debug!("Ignoring tick for untracked instrument {}", instrument);
            return skip(SkipReason::NotTracked);
        }
        assignment.evaluate(observation.timestamp, lifespan)
    }

    /// Feed every observation of one time slice, then evaluate once
    pub fn on_slice(&mut self, observations: &[(Instrument, Observation)]) -> TickOutcome {
        let lifespan = self.lifespan;
        let Some(assignment) = self.assignment.as_mut() else {
            return skip(SkipReason::Unassigned);
        };

        let mut at: Option<DateTime<Utc>> = None;
        for (instrument, observation) in observations {
            if assignment.pair.record(instrument, *observation).is_some() {
                at = Some(at.map_or(observation.timestamp, |t| t.max(observation.timestamp)));
            } else {
                tracing::debug!("Ignoring tick for untracked instrument {}", instrument);
            }
        }

        match at {
            Some(at) => assignment.evaluate(at, lifespan),
            None => skip(SkipReason::NotTracked),
        }
    }

    pub fn state(&self) -> Option<EngineState> {
        self.assignment.as_ref().map(|a| a.state)
    }

    pub fn is_active(&self) -> bool {
        self.state() == Some(EngineState::Active)
    }

    pub fn pair(&self) -> Option<&PairState> {
        self.assignment.as_ref().map(|a| &a.pair)
    }

    pub fn short_window(&self) -> Option<&RollingStatistic> {
        self.assignment.as_ref().map(|a| &a.short)
    }

    pub fn long_window(&self) -> Option<&RollingStatistic> {
        self.assignment.as_ref().map(|a| &a.long)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        match &self.assignment {
            Some(a) => EngineSnapshot {
                state: Some(a.state),
                epoch: a.epoch,
                instrument_a: Some(a.pair.instrument_a().clone()),
                instrument_b: Some(a.pair.instrument_b().clone()),
                short_samples: a.short.len(),
                long_samples: a.long.len(),
                short: a.short.partial(),
                long: a.long.partial(),
            },
            None => EngineSnapshot {
                state: None,
                epoch: 0,
                instrument_a: None,
                instrument_b: None,
                short_samples: 0,
                long_samples: 0,
                short: None,
                long: None,
            },
        }
    }
}

impl Assignment {
    fn evaluate(&mut self, at: DateTime<Utc>, lifespan: Duration) -> TickOutcome {
        if self.state == EngineState::WarmingUp {
            return skip(SkipReason::WarmingUp);
        }
        let Some((a, b)) = self.pair.latest() else {
            tracing::debug!("Skipping tick at {}: one leg has no observation", at);
            return skip(SkipReason::MissingLeg);
        };

        let spread = SpreadCalculator::live(a, b);
        if !spread.is_finite() {
            tracing::debug!("Skipping tick at {}: non-finite spread {:?}", at, spread);
            return skip(SkipReason::NonFiniteSpread);
        }

        self.short.update(spread.price);
        self.long.update(spread.volume);

        let (short, long) = match (self.short.current(), self.long.current()) {
            (Ok(short), Ok(long)) => (short, long),
            (Err(missing), _) | (_, Err(missing)) => return TickOutcome::InsufficientData(missing),
        };

        let thresholds = Thresholds::from_stats(&short, &long);
        let evaluation = Evaluation {
            at,
            price_spread: spread.price,
            volume_spread: spread.volume,
            short,
            long,
            thresholds,
        };

        match thresholds.decide(&spread) {
            Some(direction_a) => {
                let group = SignalGroup::pair(
                    self.pair.instrument_a().clone(),
                    self.pair.instrument_b().clone(),
                    direction_a,
                    at,
                    lifespan,
                );
                tracing::info!(
                    "Signal {} | spread {:.4} (bands {:.4}/{:.4}) | volume {:.0} > {:.0}",
                    group,
                    spread.price,
                    thresholds.lower_short,
                    thresholds.upper,
                    spread.volume,
                    thresholds.lower_long
                );
                TickOutcome::Emitted { group, evaluation }
            }
            None => TickOutcome::NoSignal(evaluation),
        }
    }
}

fn skip(reason: SkipReason) -> TickOutcome {
    TickOutcome::Skipped(reason)
}
