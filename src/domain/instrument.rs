//! Instrument identity and per-instrument observations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque instrument identifier (ticker, symbol id, mint...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Instrument {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Instrument {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One price/volume print for a single instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }
}

/// Historical close for one instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PriceBar {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_identity() {
        let a = Instrument::new("XOM");
        let b: Instrument = "XOM".into();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "XOM");
        assert_eq!(a.to_string(), "XOM");
        assert_ne!(a, Instrument::new("BP"));
    }

    #[test]
    fn test_instrument_serializes_as_plain_string() {
        let json = serde_json::to_string(&Instrument::new("BP")).unwrap();
        assert_eq!(json, "\"BP\"");
    }
}
