//! Domain Layer - Core types for the pairs signal generator
//!
//! Pure value types with no I/O. All external interactions happen through
//! the ports layer.

pub mod instrument;
pub mod pair;
pub mod signal;

pub use instrument::{Instrument, Observation, PriceBar};
pub use pair::{Leg, PairState};
pub use signal::{Direction, Signal, SignalGroup};
