// Root system engine: owns all growth state and advances it step by step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{RootTypeParams, SimParams};
use crate::root::Root;
use crate::scale::ElongationScale;
use crate::types::Vector3;

/// Parameters of one root type plus the elongation-scale handle its growth
/// evaluations read.
#[derive(Clone, Debug)]
struct RootTypeState {
    params: RootTypeParams,
    scale: ElongationScale,
}

/// Full mutable state of one simulated root architecture.
///
/// `Clone` produces a deep, independently evolving copy: the cloned RNG
/// carries the same stream state, so origin and clone advanced with the same
/// steps stay identical. The elongation-scale handle is shared between origin
/// and clone on purpose; it is a run-wide control input, not growth state.
#[derive(Clone, Debug)]
pub struct RootSystem {
    types: Vec<RootTypeState>,
    pub roots: Vec<Root>,
    resolution: f64,
    rng: StdRng,
    time: f64,
}

impl RootSystem {
    /// Builds the initial architecture. Every root type is wired to the same
    /// `scale` handle, so one `set` call reaches all growth evaluations.
    pub fn new(params: &SimParams, scale: ElongationScale, seed: u64) -> Self {
        let types = params
            .root_types
            .iter()
            .map(|p| RootTypeState {
                params: p.clone(),
                scale: scale.clone(),
            })
            .collect();
        let mut system = Self {
            types,
            roots: Vec::new(),
            resolution: params.resolution,
            rng: StdRng::seed_from_u64(seed),
            time: 0.0,
        };
        system.plant(params.basal_roots);
        system
    }

    /// Taproot straight down, basal roots tilted off the vertical.
    fn plant(&mut self, basal_roots: usize) {
        self.roots
            .push(Root::new(0, None, Vector3::ZERO, Vector3::DOWN, 0.0));
        let theta = self.types[0].params.theta;
        for _ in 0..basal_roots {
            let heading = self.tilted_heading(Vector3::DOWN, theta * 0.5);
            self.roots
                .push(Root::new(0, None, Vector3::ZERO, heading, 0.0));
        }
    }

    /// Advances the whole architecture by `dt` days in place, honoring the
    /// currently set elongation scale.
    pub fn simulate(&mut self, dt: f64) {
        let existing = self.roots.len();
        let mut spawned: Vec<Root> = Vec::new();

        for i in 0..existing {
            let age_before = self.roots[i].age;
            self.roots[i].age += dt;

            // A lateral only grows for the part of dt past its emergence.
            let grow_dt = (age_before + dt).min(dt);
            if grow_dt <= 0.0 {
                continue;
            }

            let ty = &self.types[self.roots[i].type_index];
            let p = &ty.params;
            let unconstrained =
                p.growth
                    .increment(self.roots[i].length, grow_dt, p.r, p.lmax);
            let dl = unconstrained * ty.scale.get();
            if dl > 0.0 {
                self.elongate(i, dl);
            }
            self.emit_laterals(i, &mut spawned);
        }

        self.roots.extend(spawned);
        self.time += dt;
    }

    /// Extends the tip polyline by `dl` cm in resolution-sized segments, each
    /// with heading wander and gravitropic pull.
    fn elongate(&mut self, i: usize, dl: f64) {
        let (sigma, gravitropism) = {
            let p = &self.types[self.roots[i].type_index].params;
            (p.sigma, p.gravitropism)
        };
        let mut remaining = dl;
        while remaining > 1e-9 {
            let step = remaining.min(self.resolution);
            let heading = self.roots[i].heading;
            let heading = self.deflected(heading, sigma * step, gravitropism * step);
            let tip = self.roots[i].tip();
            let root = &mut self.roots[i];
            root.nodes.push(tip + heading * step);
            root.heading = heading;
            root.length += step;
            remaining -= step;
        }
    }

    /// Spawns laterals wherever the parent's length has crossed the next
    /// branching position `lb + k*ln` behind the apical zone.
    fn emit_laterals(&mut self, i: usize, spawned: &mut Vec<Root>) {
        let p = self.types[self.roots[i].type_index].params.clone();
        let Some(successor) = p.successor else {
            return;
        };
        let (delay, theta) = {
            let sp = &self.types[successor].params;
            (sp.delay, sp.theta)
        };
        loop {
            let k = self.roots[i].laterals_emitted;
            if k >= p.max_laterals {
                break;
            }
            let at = p.lb + k as f64 * p.ln;
            if at > self.roots[i].length - p.la {
                break;
            }
            let base = self.roots[i].point_at(at);
            let axis = self.roots[i].direction_at(at);
            let heading = self.tilted_heading(axis, theta);
            spawned.push(Root::new(successor, Some(i), base, heading, -delay));
            self.roots[i].laterals_emitted += 1;
        }
    }

    /// Unit vector at angle `theta` from `axis`, azimuth chosen at random.
    fn tilted_heading(&mut self, axis: Vector3, theta: f64) -> Vector3 {
        let axis = axis.normalized_or(Vector3::DOWN);
        let reference = if axis.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };
        let u = axis.cross(&reference).normalized_or(Vector3::new(0.0, 1.0, 0.0));
        let v = axis.cross(&u);
        let phi = self.rng.gen_range(0.0..std::f64::consts::TAU);
        (axis * theta.cos() + (u * phi.cos() + v * phi.sin()) * theta.sin())
            .normalized_or(axis)
    }

    /// Perturbed tip heading: random wander plus downward pull, renormalized.
    fn deflected(&mut self, heading: Vector3, sigma: f64, gravitropism: f64) -> Vector3 {
        let jitter = Vector3::new(
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
            self.rng.gen_range(-1.0..1.0),
        ) * sigma;
        (heading + jitter + Vector3::DOWN * gravitropism).normalized_or(heading)
    }

    /// Sum of all root lengths (cm).
    pub fn total_length(&self) -> f64 {
        self.roots.iter().map(|r| r.length).sum()
    }

    /// All node positions, root by root, base to tip.
    pub fn node_positions(&self) -> Vec<Vector3> {
        self.roots
            .iter()
            .flat_map(|r| r.nodes.iter().copied())
            .collect()
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|r| r.nodes.len()).sum()
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimParams;
    use crate::growth::GrowthFunction;

    /// Single unbranched root type growing straight down at 2 cm/day.
    fn bare_params() -> SimParams {
        SimParams {
            resolution: 0.5,
            basal_roots: 0,
            root_types: vec![RootTypeParams {
                name: "test".to_string(),
                r: 2.0,
                lmax: 100.0,
                growth: GrowthFunction::Linear,
                lb: 1.0,
                la: 1.0,
                ln: 1.0,
                max_laterals: 0,
                successor: None,
                delay: 0.0,
                theta: 1.2,
                sigma: 0.0,
                gravitropism: 0.0,
            }],
        }
    }

    #[test]
    fn unconstrained_growth_follows_the_rate() {
        let mut system = RootSystem::new(&bare_params(), ElongationScale::new(1.0), 1);
        system.simulate(1.0);
        assert!((system.total_length() - 2.0).abs() < 1e-9);
        system.simulate(1.0);
        assert!((system.total_length() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn scale_multiplies_the_increment() {
        let scale = ElongationScale::new(1.0);
        let mut system = RootSystem::new(&bare_params(), scale.clone(), 1);
        scale.set(0.5);
        system.simulate(1.0);
        assert!((system.total_length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn scale_reaches_every_root_type() {
        let scale = ElongationScale::new(1.0);
        let mut system = RootSystem::new(&SimParams::default(), scale.clone(), 7);
        // two steps so laterals pass their emergence delay and grow too
        system.simulate(6.0);
        system.simulate(6.0);
        assert!(system.roots.iter().any(|r| r.type_index > 0 && r.length > 0.0));
        let before = system.total_length();

        scale.set(0.0);
        system.simulate(1.0);
        assert!((system.total_length() - before).abs() < 1e-9);
    }

    #[test]
    fn clone_evolves_identically_and_independently() {
        let mut system = RootSystem::new(&SimParams::default(), ElongationScale::new(1.0), 42);
        system.simulate(5.0);

        let mut copy = system.clone();
        system.simulate(5.0);
        copy.simulate(5.0);

        let a = system.node_positions();
        let b = copy.node_positions();
        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(&b).all(|(p, q)| p == q));

        // advancing one afterwards must not touch the other
        let copy_length = copy.total_length();
        system.simulate(2.0);
        assert_eq!(copy.total_length(), copy_length);
        assert!(system.total_length() > copy_length);
    }

    #[test]
    fn laterals_emerge_after_their_delay() {
        let mut params = bare_params();
        params.root_types[0].max_laterals = 5;
        params.root_types[0].successor = Some(1);
        params.root_types.push(RootTypeParams {
            name: "lat".to_string(),
            r: 1.0,
            lmax: 10.0,
            delay: 2.0,
            max_laterals: 0,
            successor: None,
            ..Default::default()
        });

        let mut system = RootSystem::new(&params, ElongationScale::new(1.0), 3);
        // after 2 days the taproot is 4 cm: branch zone covers lb=1..=3
        system.simulate(1.0);
        system.simulate(1.0);
        assert!(system.root_count() > 1);
        let laterals: Vec<_> = system.roots.iter().filter(|r| r.type_index == 1).collect();
        assert!(!laterals.is_empty());
        assert!(laterals.iter().all(|r| r.parent == Some(0)));
        // still inside the emergence delay: no length yet
        assert!(laterals.iter().all(|r| r.length == 0.0));

        system.simulate(3.0);
        assert!(system
            .roots
            .iter()
            .filter(|r| r.type_index == 1)
            .any(|r| r.length > 0.0));
    }

    #[test]
    fn total_length_is_monotonic() {
        let mut system = RootSystem::new(&SimParams::default(), ElongationScale::new(1.0), 9);
        let mut previous = system.total_length();
        for _ in 0..10 {
            system.simulate(1.0);
            let current = system.total_length();
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn node_spacing_respects_the_resolution() {
        let mut system = RootSystem::new(&bare_params(), ElongationScale::new(1.0), 5);
        system.simulate(3.0);
        let root = &system.roots[0];
        for pair in root.nodes.windows(2) {
            assert!(pair[0].distance(&pair[1]) <= 0.5 + 1e-9);
        }
    }
}
