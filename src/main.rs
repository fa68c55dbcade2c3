use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::Rng;
use tracing::info;

mod cap;
mod config;
mod driver;
mod growth;
mod logging;
mod output;
mod root;
mod scale;
mod sweep;
mod system;
mod types;

use cap::GrowthCap;
use config::{RunConfig, SimParams};
use scale::ElongationScale;
use system::RootSystem;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Simulated time span (days)
    #[arg(long, default_value_t = 30.0)]
    simtime: f64,

    /// Time step (days)
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Maximal total length increment (cm/day)
    #[arg(long, default_value_t = 20.0)]
    max_inc: f64,

    /// Architecture parameter file (YAML or JSON). If not specified, searches for params.yaml, params.yml, or params.json in the current directory.
    #[arg(short, long)]
    params: Option<String>,

    /// RNG seed; picked at random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Output geometry file (VTP)
    #[arg(long, default_value = "results/rootcap.vtp")]
    out: PathBuf,

    /// Write per-day telemetry as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Comma-separated cap values (cm/day); runs one independent simulation per value in parallel
    #[arg(long)]
    sweep: Option<String>,

    /// Verify that a cloned system evolves identically to, and independently of, its origin, then exit
    #[arg(long)]
    copy_test: bool,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let params = load_params(args.params.as_deref())?;
    params.validate()?;
    let config = RunConfig {
        simtime: args.simtime,
        dt: args.dt,
        max_inc: args.max_inc,
    };
    config.validate()?;

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(seed, "starting");

    if args.copy_test {
        return copy_test(&params, seed);
    }

    if let Some(spec) = args.sweep.as_deref() {
        let caps = parse_caps(spec)?;
        let reports = sweep::run(&params, &config, &caps, seed)?;
        let report_path = args
            .report
            .unwrap_or_else(|| PathBuf::from("results/rootcap_sweep.json"));
        write_json(&reports, &report_path)?;
        info!(path = %report_path.display(), runs = reports.len(), "sweep reports written");
        return Ok(());
    }

    let scale = ElongationScale::new(1.0);
    let mut system = RootSystem::new(&params, scale.clone(), seed);
    let cap = GrowthCap::new(args.max_inc, scale)?;

    let report = driver::run(&config, &mut system, &cap);
    info!(
        final_length = report.final_length,
        capped_days = report.capped_days,
        roots = system.root_count(),
        sim_time = system.time(),
        "simulation complete"
    );

    output::write_vtp(&system, &args.out)?;
    info!(path = %args.out.display(), "geometry written");

    if let Some(path) = args.report.as_deref() {
        write_json(&report, path)?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

/// Load architecture parameters from a file or fall back to defaults.
fn load_params(path: Option<&str>) -> Result<SimParams> {
    if let Some(path) = path {
        SimParams::from_file(path)
            .with_context(|| format!("failed to load parameters from {path}"))
    } else {
        Ok(SimParams::from_default_paths())
    }
}

fn parse_caps(spec: &str) -> Result<Vec<f64>> {
    let caps = spec
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid cap value {part:?} in --sweep"))
        })
        .collect::<Result<Vec<_>>>()?;
    if caps.is_empty() {
        bail!("--sweep needs at least one cap value");
    }
    Ok(caps)
}

fn write_json<T: serde::Serialize>(value: &T, path: &std::path::Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
    }
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Grow a system partway, clone it, grow both the same further span, and
/// check that the two node sets are identical.
fn copy_test(params: &SimParams, seed: u64) -> Result<()> {
    let scale = ElongationScale::new(1.0);
    let mut system = RootSystem::new(params, scale, seed);
    let diverged = driver::clone_divergence(&mut system, 20.0, 10.0);
    info!(
        nodes = system.node_count(),
        diverged, "copy test finished"
    );
    if diverged > 0 {
        bail!("clone diverged from its origin in {diverged} node positions");
    }
    Ok(())
}
