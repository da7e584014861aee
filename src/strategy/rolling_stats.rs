//! Rolling Window Statistics
//!
//! Online mean and population standard deviation over the last `capacity`
//! samples. Insertions use Welford's update while the window fills; once
//! full, each insert replaces the oldest sample with the paired
//! add/remove form of the same update:
//!
//! ```text
//! mean' = mean + (x_new - x_old) / n
//! M2'   = M2 + (x_new - x_old) * (x_new - mean' + x_old - mean)
//! ```
//!
//! Removing a sample that carries most of `M2` cancels catastrophically, so
//! those evictions (and every `capacity` evictions regardless) rebase the
//! aggregates with an exact two-pass sweep over the window. A two-sample
//! window rebases on every eviction: each sample there carries exactly half
//! of `M2`, so the share test cannot single out the dominant one.
//!
//! Standard deviation is the population form: `sqrt(M2 / n)`, not `n - 1`.

use std::collections::VecDeque;

use serde::Serialize;
use thiserror::Error;

use crate::strategy::params::ConfigError;

/// Evicting a sample whose squared deviation exceeds this share of M2 forces a rebase
const REBASE_SHARE: f64 = 0.5;

/// Windows up to this capacity rebase on every eviction
const ALWAYS_REBASE_CAPACITY: usize = 2;

/// Mean and population standard deviation of a full window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
    /// Number of samples the stats cover
    pub count: usize,
}

/// The window has not yet seen `required` samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Insufficient data: window requires {required} samples, has {available}")]
pub struct InsufficientData {
    pub required: usize,
    pub available: usize,
}

/// Fixed-capacity FIFO window with running mean and variance
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStatistic {
    capacity: usize,
    samples: VecDeque<f64>,
    mean: f64,
    /// Sum of squared deviations from `mean`
    m2: f64,
    evictions_since_rebase: usize,
}

impl RollingStatistic {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::InvalidWindow {
                window: "rolling",
                capacity,
            });
        }
        Ok(Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            mean: 0.0,
            m2: 0.0,
            evictions_since_rebase: 0,
        })
    }

    /// Insert one sample, evicting the oldest when at capacity
    pub fn update(&mut self, value: f64) {
        if self.samples.len() < self.capacity {
            self.samples.push_back(value);
            let n = self.samples.len() as f64;
            let delta = value - self.mean;
            self.mean += delta / n;
            self.m2 += delta * (value - self.mean);
            self.clamp_m2();
            return;
        }

        let Some(old) = self.samples.pop_front() else {
            return;
        };
        self.samples.push_back(value);
        self.evictions_since_rebase += 1;

        let old_dev = old - self.mean;
        if self.capacity <= ALWAYS_REBASE_CAPACITY
            || self.evictions_since_rebase >= self.capacity
            || old_dev * old_dev > REBASE_SHARE * self.m2
        {
            self.rebase();
            return;
        }

        let n = self.capacity as f64;
        let new_mean = self.mean + (value - old) / n;
        self.m2 += (value - old) * (value - new_mean + old - self.mean);
        self.mean = new_mean;
        self.clamp_m2();
    }

    /// Stats over the full window, or `InsufficientData` until `capacity` samples arrived
    pub fn current(&self) -> Result<WindowStats, InsufficientData> {
        if self.samples.len() < self.capacity {
            return Err(InsufficientData {
                required: self.capacity,
                available: self.samples.len(),
            });
        }
        Ok(self.stats())
    }

    /// Stats over whatever the window holds, for diagnostics only
    pub fn partial(&self) -> Option<WindowStats> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.stats())
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Window contents, oldest first
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    fn stats(&self) -> WindowStats {
        let n = self.samples.len();
        WindowStats {
            mean: self.mean,
            std_dev: (self.m2 / n as f64).sqrt(),
            count: n,
        }
    }

    /// Exact two-pass recomputation from the stored window
    fn rebase(&mut self) {
        let n = self.samples.len() as f64;
        let mean = self.samples.iter().sum::<f64>() / n;
        let m2 = self
            .samples
            .iter()
            .map(|&x| {
                let d = x - mean;
                d * d
            })
            .sum::<f64>();
        self.mean = mean;
        self.m2 = m2;
        self.evictions_since_rebase = 0;
    }

    fn clamp_m2(&mut self) {
        if self.m2 < 0.0 {
            self.m2 = 0.0;
        }
    }
}
