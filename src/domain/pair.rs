//! Tracked pair and the latest observation of each leg

use crate::domain::instrument::{Instrument, Observation};

/// Which side of the pair an instrument sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    A,
    B,
}

/// The two tracked instruments and their most recent observations
#[derive(Debug, Clone, PartialEq)]
pub struct PairState {
    instrument_a: Instrument,
    instrument_b: Instrument,
    latest_a: Option<Observation>,
    latest_b: Option<Observation>,
}

impl PairState {
    pub fn new(instrument_a: Instrument, instrument_b: Instrument) -> Self {
        Self {
            instrument_a,
            instrument_b,
            latest_a: None,
            latest_b: None,
        }
    }

    pub fn instrument_a(&self) -> &Instrument {
        &self.instrument_a
    }

    pub fn instrument_b(&self) -> &Instrument {
        &self.instrument_b
    }

    /// Resolve an instrument to its leg, `None` if it is not part of the pair
    pub fn leg_of(&self, instrument: &Instrument) -> Option<Leg> {
        if *instrument == self.instrument_a {
            Some(Leg::A)
        } else if *instrument == self.instrument_b {
            Some(Leg::B)
        } else {
            None
        }
    }

    /// Record an observation. Returns the leg it landed on, or `None` (and
    /// leaves the state untouched) for a foreign instrument.
    pub fn record(&mut self, instrument: &Instrument, observation: Observation) -> Option<Leg> {
        let leg = self.leg_of(instrument)?;
        match leg {
            Leg::A => self.latest_a = Some(observation),
            Leg::B => self.latest_b = Some(observation),
        }
        Some(leg)
    }

    /// Both legs, once each has been observed at least once
    pub fn latest(&self) -> Option<(&Observation, &Observation)> {
        Some((self.latest_a.as_ref()?, self.latest_b.as_ref()?))
    }

    pub fn latest_a(&self) -> Option<&Observation> {
        self.latest_a.as_ref()
    }

    pub fn latest_b(&self) -> Option<&Observation> {
        self.latest_b.as_ref()
    }

    /// Same two instruments in the same order
    pub fn tracks(&self, instrument_a: &Instrument, instrument_b: &Instrument) -> bool {
        self.instrument_a == *instrument_a && self.instrument_b == *instrument_b
    }
}
