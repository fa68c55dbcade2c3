// Parallel sweep over daily cap values: one fully independent run per cap.

use anyhow::Result;
use rayon::prelude::*;
use tracing::info;

use crate::cap::GrowthCap;
use crate::config::{RunConfig, SimParams};
use crate::driver::{self, RunReport};
use crate::scale::ElongationScale;
use crate::system::RootSystem;

/// Runs one simulation per cap value in parallel. Every run builds its own
/// state and its own scale handle; nothing mutable crosses a run boundary.
pub fn run(params: &SimParams, base: &RunConfig, caps: &[f64], seed: u64) -> Result<Vec<RunReport>> {
    caps.par_iter()
        .map(|&max_inc| {
            let config = RunConfig { max_inc, ..*base };
            config.validate()?;

            let scale = ElongationScale::new(1.0);
            let mut system = RootSystem::new(params, scale.clone(), seed);
            let cap = GrowthCap::new(max_inc, scale)?;

            let report = driver::run(&config, &mut system, &cap);
            info!(
                max_inc,
                final_length = report.final_length,
                capped_days = report.capped_days,
                "sweep run complete"
            );
            Ok(report)
        })
        .collect()
}
