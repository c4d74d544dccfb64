//! Numerical tolerances shared by pricing, branching and propagation.

use serde::{Deserialize, Serialize};

/// Tolerances used when comparing LP values.
///
/// `epsilon` governs pricing: profit scaling and the negative-score test.
/// `feastol` governs checks on primal LP values (integrality, zero bounds);
/// interior-point backends do not land exactly on vertices, so it is looser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub epsilon: f64,
    pub feastol: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            epsilon: 1e-10,
            feastol: 1e-6,
        }
    }
}

impl Tolerances {
    #[inline]
    pub fn is_feas_integral(&self, x: f64) -> bool {
        (x - x.round()).abs() <= self.feastol
    }

    #[inline]
    pub fn is_feas_zero(&self, x: f64) -> bool {
        x.abs() <= self.feastol
    }

    #[inline]
    pub fn is_feas_positive(&self, x: f64) -> bool {
        x > self.feastol
    }

    #[inline]
    pub fn is_feas_le(&self, a: f64, b: f64) -> bool {
        a <= b + self.feastol
    }

    /// A pricing score that improves the master.
    #[inline]
    pub fn is_improving(&self, score: f64) -> bool {
        score < -self.epsilon
    }

    /// Smallest integer not below the value, tolerating round-off.
    #[inline]
    pub fn feas_ceil(&self, x: f64) -> f64 {
        (x - self.feastol).ceil()
    }
}
