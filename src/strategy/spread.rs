//! Spread calculation for a pair of observations

use crate::domain::Observation;
use crate::strategy::params::PRICE_SPREAD_DAMPENING;

/// Price and volume spread of one paired observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    /// `(price_b - price_a) * 0.9`
    pub price: f64,
    /// `volume_a + volume_b`
    pub volume: f64,
}

impl Spread {
    pub fn is_finite(&self) -> bool {
        self.price.is_finite() && self.volume.is_finite()
    }
}

/// Stateless spread functions
pub struct SpreadCalculator;

impl SpreadCalculator {
    /// Live spread: damped price difference and summed volume
    pub fn live(a: &Observation, b: &Observation) -> Spread {
        Spread {
            price: (b.price - a.price) * PRICE_SPREAD_DAMPENING,
            volume: a.volume + b.volume,
        }
    }

    /// Warm-up replay spread: the raw, undamped price difference
    pub fn replay(price_a: f64, price_b: f64) -> f64 {
        price_b - price_a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Utc;

    #[test]
    fn test_live_spread() {
        let now = Utc::now();
        let a = Observation::new(now, 80.0, 1_200.0);
        let b = Observation::new(now, 35.0, 800.0);

        let spread = SpreadCalculator::live(&a, &b);
        assert_relative_eq!(spread.price, -45.0 * 0.9);
        assert_eq!(spread.volume, 2_000.0);
        assert!(spread.is_finite());
    }

    #[test]
    fn test_live_spread_is_ordered() {
        let now = Utc::now();
        let a = Observation::new(now, 10.0, 1.0);
        let b = Observation::new(now, 12.0, 2.0);

        assert_relative_eq!(SpreadCalculator::live(&a, &b).price, 1.8);
        assert_relative_eq!(SpreadCalculator::live(&b, &a).price, -1.8);
    }

    #[test]
    fn test_replay_spread_is_undamped() {
        assert_eq!(SpreadCalculator::replay(10.0, 12.0), 2.0);
        assert_eq!(SpreadCalculator::replay(12.0, 10.0), -2.0);
    }

    #[test]
    fn test_non_finite_detected() {
        let now = Utc::now();
        let a = Observation::new(now, f64::NAN, 1.0);
        let b = Observation::new(now, 1.0, 1.0);
        assert!(!SpreadCalculator::live(&a, &b).is_finite());
    }
}
