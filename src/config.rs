// Run configuration and root architecture parameters

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::growth::GrowthFunction;

/// Scalar run parameters. Validated once at setup; no per-day checks.
#[derive(Clone, Copy, Debug)]
pub struct RunConfig {
    /// Simulated time span (days).
    pub simtime: f64,
    /// Days per step.
    pub dt: f64,
    /// Maximal total length increment (cm/day).
    pub max_inc: f64,
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.simtime > 0.0) || !self.simtime.is_finite() {
            return Err(anyhow!("simtime must be > 0 (got {})", self.simtime));
        }
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(anyhow!("dt must be > 0 (got {})", self.dt));
        }
        if !(self.max_inc > 0.0) || !self.max_inc.is_finite() {
            return Err(anyhow!("max_inc must be > 0 (got {})", self.max_inc));
        }
        Ok(())
    }

    /// Number of simulated days.
    pub fn steps(&self) -> usize {
        (self.simtime / self.dt).round() as usize
    }
}

/// Parameter set for one root type.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RootTypeParams {
    pub name: String,

    // Elongation
    /// Initial elongation rate (cm/day).
    pub r: f64,
    /// Maximum root length (cm).
    pub lmax: f64,
    pub growth: GrowthFunction,

    // Branching zones along the root axis (cm)
    /// Basal zone: no laterals closer to the base.
    pub lb: f64,
    /// Apical zone: no laterals closer to the tip.
    pub la: f64,
    /// Spacing between successive laterals.
    pub ln: f64,
    pub max_laterals: usize,
    /// Root type spawned as laterals, if any.
    pub successor: Option<usize>,
    /// Days between a lateral's creation and the start of its growth.
    pub delay: f64,

    // Geometry
    /// Insertion angle of laterals against the parent axis (radians).
    pub theta: f64,
    /// Tip heading wander per cm grown.
    pub sigma: f64,
    /// Downward bias of the tip heading per cm grown.
    pub gravitropism: f64,
}

impl Default for RootTypeParams {
    fn default() -> Self {
        Self {
            name: "root".to_string(),
            r: 2.0,
            lmax: 100.0,
            growth: GrowthFunction::Linear,
            lb: 1.0,
            la: 2.0,
            ln: 1.0,
            max_laterals: 0,
            successor: None,
            delay: 0.0,
            theta: 1.22,
            sigma: 0.3,
            gravitropism: 0.3,
        }
    }
}

/// Full architecture description: root types plus global engine settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Axial distance between consecutive polyline nodes (cm).
    pub resolution: f64,
    /// Basal roots planted next to the taproot at initialization.
    pub basal_roots: usize,
    pub root_types: Vec<RootTypeParams>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            resolution: 0.25,
            basal_roots: 4,
            root_types: vec![
                RootTypeParams {
                    name: "taproot".to_string(),
                    r: 3.0,
                    lmax: 150.0,
                    growth: GrowthFunction::Linear,
                    lb: 1.0,
                    la: 2.0,
                    ln: 1.0,
                    max_laterals: 120,
                    successor: Some(1),
                    delay: 0.0,
                    theta: 1.22,
                    sigma: 0.2,
                    gravitropism: 0.4,
                },
                RootTypeParams {
                    name: "lateral".to_string(),
                    r: 1.2,
                    lmax: 25.0,
                    growth: GrowthFunction::Linear,
                    lb: 0.5,
                    la: 1.0,
                    ln: 0.8,
                    max_laterals: 30,
                    successor: Some(2),
                    delay: 2.0,
                    theta: 1.22,
                    sigma: 0.4,
                    gravitropism: 0.15,
                },
                RootTypeParams {
                    name: "fine lateral".to_string(),
                    r: 0.5,
                    lmax: 3.0,
                    growth: GrowthFunction::Linear,
                    lb: 0.2,
                    la: 0.5,
                    ln: 0.0,
                    max_laterals: 0,
                    successor: None,
                    delay: 3.0,
                    theta: 1.3,
                    sigma: 0.5,
                    gravitropism: 0.05,
                },
            ],
        }
    }
}

impl SimParams {
    /// Load parameters from a YAML or JSON file, decided by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let params = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
                .with_context(|| format!("invalid YAML in {}", path.display()))?,
            Some("json") => serde_json::from_str(&raw)
                .with_context(|| format!("invalid JSON in {}", path.display()))?,
            other => {
                return Err(anyhow!(
                    "unsupported parameter file extension {:?} (expected yaml, yml, or json)",
                    other.unwrap_or("")
                ))
            }
        };
        Ok(params)
    }

    /// Search the working directory for a parameter file; fall back to the
    /// built-in architecture.
    pub fn from_default_paths() -> Self {
        for candidate in ["params.yaml", "params.yml", "params.json"] {
            if Path::new(candidate).exists() {
                match Self::from_file(candidate) {
                    Ok(params) => {
                        info!(path = candidate, "loaded parameters");
                        return params;
                    }
                    Err(err) => {
                        warn!(path = candidate, error = %err, "skipping unreadable parameter file");
                    }
                }
            }
        }
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.resolution > 0.0) || !self.resolution.is_finite() {
            return Err(anyhow!("resolution must be > 0 (got {})", self.resolution));
        }
        if self.root_types.is_empty() {
            return Err(anyhow!("at least one root type is required"));
        }
        for (i, rt) in self.root_types.iter().enumerate() {
            let label = format!("root type {} ({})", i, rt.name);
            if !(rt.r > 0.0) || !rt.r.is_finite() {
                return Err(anyhow!("{label}: r must be > 0 (got {})", rt.r));
            }
            if !(rt.lmax > 0.0) || !rt.lmax.is_finite() {
                return Err(anyhow!("{label}: lmax must be > 0 (got {})", rt.lmax));
            }
            if rt.lb < 0.0 || rt.la < 0.0 {
                return Err(anyhow!("{label}: lb and la must be >= 0"));
            }
            if rt.delay < 0.0 {
                return Err(anyhow!("{label}: delay must be >= 0 (got {})", rt.delay));
            }
            if rt.sigma < 0.0 {
                return Err(anyhow!("{label}: sigma must be >= 0 (got {})", rt.sigma));
            }
            if !(rt.theta > 0.0) || rt.theta >= std::f64::consts::PI {
                return Err(anyhow!(
                    "{label}: theta must be in (0, pi) radians (got {})",
                    rt.theta
                ));
            }
            if let Some(succ) = rt.successor {
                if succ >= self.root_types.len() {
                    return Err(anyhow!(
                        "{label}: successor {succ} does not name a root type (have {})",
                        self.root_types.len()
                    ));
                }
                if rt.max_laterals > 0 && !(rt.ln > 0.0) {
                    return Err(anyhow!(
                        "{label}: ln must be > 0 when laterals are enabled (got {})",
                        rt.ln
                    ));
                }
            }
        }
        Ok(())
    }
}
