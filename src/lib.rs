//! Pairs Alpha - Two-instrument statistical arbitrage signal library
//!
//! Tracks the damped price spread and summed volume of a pair over rolling
//! windows and emits paired Up/Down signals when the spread breaks its bands.
//!
//! # Modules
//!
//! - `domain`: Core types (Instrument, Observation, PairState, Signal)
//! - `ports`: Trait abstractions (HistoryPort, SignalSink)
//! - `strategy`: Rolling statistics, spread, warm-up and the decision engine
//! - `adapters`: External implementations (JSON feeds, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Orchestrator driving the engine from events

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
