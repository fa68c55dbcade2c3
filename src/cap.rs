//! Daily carbon-budget feedback loop.
//!
//! Scaling elongation does not scale total growth proportionally, because
//! branching keeps adding new tips while a step runs. Instead of estimating
//! the response analytically, each day first runs an unconstrained step on a
//! disposable clone of the state to measure how much the system would grow,
//! then derives a proportional scale correction from that measurement and
//! commits a corrected step to the real state. The correction is a single
//! pass against the trial measurement and is not re-verified afterwards, so
//! the committed increment can exceed the budget slightly.

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::scale::ElongationScale;
use crate::system::RootSystem;

/// Telemetry of one trial/commit cycle.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct DayOutcome {
    pub start_length: f64,
    /// Growth the trial step measured at scale 1.0.
    pub trial_increment: f64,
    /// Scale the commit step ran with.
    pub scale: f64,
    pub committed_increment: f64,
    pub end_length: f64,
}

impl DayOutcome {
    pub fn capped(&self) -> bool {
        self.scale < 1.0
    }
}

/// Enforces a daily total-length budget of `max_inc * dt` centimeters.
pub struct GrowthCap {
    max_inc: f64,
    scale: ElongationScale,
}

impl GrowthCap {
    /// `scale` must be the same handle the system's root types were wired to.
    pub fn new(max_inc: f64, scale: ElongationScale) -> Result<Self> {
        if !(max_inc > 0.0) || !max_inc.is_finite() {
            return Err(anyhow!("max_inc must be > 0 (got {max_inc})"));
        }
        Ok(Self { max_inc, scale })
    }

    pub fn max_inc(&self) -> f64 {
        self.max_inc
    }

    /// Runs one day: trial step on a clone at full scale, correction, commit
    /// step on the real state.
    pub fn step(&self, system: &mut RootSystem, dt: f64) -> DayOutcome {
        self.scale.set(1.0);
        let start_length = system.total_length();

        // Speculative pass. The clone shares this controller's scale handle,
        // so it runs at the full rate set above.
        let trial_increment = {
            let mut trial = system.clone();
            trial.simulate(dt);
            trial.total_length() - start_length
        };

        let budget = self.max_inc * dt;
        if trial_increment > budget {
            // Proportional correction against the measured increment. A zero
            // increment never enters this branch, so no division by zero.
            self.scale.set(budget / trial_increment);
        }

        system.simulate(dt);
        let end_length = system.total_length();

        DayOutcome {
            start_length,
            trial_increment,
            scale: self.scale.get(),
            committed_increment: end_length - start_length,
            end_length,
        }
    }
}
