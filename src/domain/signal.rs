use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::instrument::Instrument;

/// Predicted direction of an instrument over the signal lifespan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "Up"),
            Direction::Down => write!(f, "Down"),
        }
    }
}

/// Directional prediction for one instrument, valid until `expires_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub instrument: Instrument,
    pub direction: Direction,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(
        instrument: Instrument,
        direction: Direction,
        generated_at: DateTime<Utc>,
        lifespan: Duration,
    ) -> Self {
        Self {
            instrument,
            direction,
            generated_at,
            expires_at: generated_at + lifespan,
        }
    }

    /// Expiry is enforced by the consumer; this is a convenience for it
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The two correlated signals of one decision. The fixed-size array makes a
/// one-legged group unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalGroup {
    pub signals: [Signal; 2],
}

impl SignalGroup {
    /// Build opposite-direction signals for `a` and `b`, `a` taking `direction_a`
    pub fn pair(
        a: Instrument,
        b: Instrument,
        direction_a: Direction,
        generated_at: DateTime<Utc>,
        lifespan: Duration,
    ) -> Self {
        Self {
            signals: [
                Signal::new(a, direction_a, generated_at, lifespan),
                Signal::new(b, direction_a.opposite(), generated_at, lifespan),
            ],
        }
    }

    pub fn first(&self) -> &Signal {
        &self.signals[0]
    }

    pub fn second(&self) -> &Signal {
        &self.signals[1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.signals[0].generated_at
    }
}

impl fmt::Display for SignalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}: {}, {}: {}]",
            self.signals[0].instrument,
            self.signals[0].direction,
            self.signals[1].instrument,
            self.signals[1].direction
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_group_directions_are_opposite() {
        let at = Utc.with_ymd_and_hms(2019, 6, 3, 14, 0, 0).unwrap();
        let group = SignalGroup::pair("XOM".into(), "BP".into(), Direction::Down, at, Duration::hours(2));

        assert_eq!(group.first().direction, Direction::Down);
        assert_eq!(group.second().direction, Direction::Up);
        assert_eq!(group.iter().count(), 2);
        assert_eq!(group.to_string(), "[XOM: Down, BP: Up]");
    }

    #[test]
    fn test_signal_expiry() {
        let at = Utc.with_ymd_and_hms(2019, 6, 3, 14, 0, 0).unwrap();
        let signal = Signal::new("XOM".into(), Direction::Up, at, Duration::hours(2));

        assert_eq!(signal.expires_at, at + Duration::hours(2));
        assert!(!signal.is_expired(at + Duration::minutes(119)));
        assert!(signal.is_expired(at + Duration::hours(2)));
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
        assert_eq!(Direction::Up.opposite(), Direction::Down);
    }
}
