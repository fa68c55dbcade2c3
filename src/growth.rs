// Growth functions: map root age to target length and back.
//
// Elongation is length-driven: a root's effective age is recovered from its
// current length, so a root that was slowed down earlier keeps growing along
// the same curve instead of jumping ahead to where its calendar age says it
// should be.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthFunction {
    /// Constant elongation rate `r` until `lmax` is reached.
    Linear,
    /// Elongation slows as the root approaches `lmax`.
    NegativeExponential,
}

impl GrowthFunction {
    /// Target length after growing for `age` days at full rate.
    pub fn length_at(&self, age: f64, r: f64, lmax: f64) -> f64 {
        match self {
            GrowthFunction::Linear => (r * age).min(lmax),
            GrowthFunction::NegativeExponential => lmax * (1.0 - (-r * age / lmax).exp()),
        }
    }

    /// Effective age of a root that has reached `length`.
    pub fn age_at(&self, length: f64, r: f64, lmax: f64) -> f64 {
        match self {
            GrowthFunction::Linear => length.min(lmax) / r,
            GrowthFunction::NegativeExponential => {
                let remaining = 1.0 - length / lmax;
                if remaining <= 0.0 {
                    f64::INFINITY
                } else {
                    -lmax / r * remaining.ln()
                }
            }
        }
    }

    /// Unconstrained length increment for a root at `length` growing `dt` days.
    pub fn increment(&self, length: f64, dt: f64, r: f64, lmax: f64) -> f64 {
        if length >= lmax {
            return 0.0;
        }
        let age = self.age_at(length, r, lmax);
        (self.length_at(age + dt, r, lmax) - length).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_increment_is_rate_times_dt() {
        let gf = GrowthFunction::Linear;
        let inc = gf.increment(5.0, 1.0, 2.0, 100.0);
        assert!((inc - 2.0).abs() < 1e-12);
    }

    #[test]
    fn linear_caps_at_max_length() {
        let gf = GrowthFunction::Linear;
        // 1 cm below lmax, a full day would overshoot
        let inc = gf.increment(99.0, 1.0, 2.0, 100.0);
        assert!((inc - 1.0).abs() < 1e-12);
        assert_eq!(gf.increment(100.0, 1.0, 2.0, 100.0), 0.0);
    }

    #[test]
    fn negexp_increments_shrink_with_length() {
        let gf = GrowthFunction::NegativeExponential;
        let early = gf.increment(0.0, 1.0, 2.0, 50.0);
        let late = gf.increment(40.0, 1.0, 2.0, 50.0);
        assert!(early > late);
        assert!(late > 0.0);
    }

    #[test]
    fn negexp_never_exceeds_max_length() {
        let gf = GrowthFunction::NegativeExponential;
        let mut length = 0.0;
        for _ in 0..1000 {
            length += gf.increment(length, 1.0, 2.0, 50.0);
        }
        assert!(length <= 50.0);
    }

    #[test]
    fn length_and_age_are_inverse() {
        for gf in [GrowthFunction::Linear, GrowthFunction::NegativeExponential] {
            let length = gf.length_at(3.5, 2.0, 50.0);
            let age = gf.age_at(length, 2.0, 50.0);
            assert!((age - 3.5).abs() < 1e-9);
        }
    }
}
