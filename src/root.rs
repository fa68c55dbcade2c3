// One root of the architecture: a polyline grown tip-forward, plus the
// bookkeeping needed to emit laterals along it.

use crate::types::Vector3;

#[derive(Clone, Debug)]
pub struct Root {
    pub type_index: usize,
    pub parent: Option<usize>,
    /// Polyline from base to tip. Always holds at least the base node.
    pub nodes: Vec<Vector3>,
    /// Current tip direction (unit vector).
    pub heading: Vector3,
    /// Accumulated length (cm).
    pub length: f64,
    /// Age in days; negative while the root waits out its emergence delay.
    pub age: f64,
    pub laterals_emitted: usize,
}

impl Root {
    pub fn new(
        type_index: usize,
        parent: Option<usize>,
        base: Vector3,
        heading: Vector3,
        age: f64,
    ) -> Self {
        Self {
            type_index,
            parent,
            nodes: vec![base],
            heading,
            length: 0.0,
            age,
            laterals_emitted: 0,
        }
    }

    pub fn tip(&self) -> Vector3 {
        *self.nodes.last().expect("root polyline is never empty")
    }

    /// Point on the polyline at arc length `arc` from the base, clamped to
    /// the tip.
    pub fn point_at(&self, arc: f64) -> Vector3 {
        let mut walked = 0.0;
        for pair in self.nodes.windows(2) {
            let seg = pair[1] - pair[0];
            let seg_len = seg.length();
            if walked + seg_len >= arc && seg_len > 0.0 {
                let t = (arc - walked) / seg_len;
                return pair[0] + seg * t;
            }
            walked += seg_len;
        }
        self.tip()
    }

    /// Local axis direction at arc length `arc`; falls back to the tip
    /// heading for a root that has not produced a segment yet.
    pub fn direction_at(&self, arc: f64) -> Vector3 {
        let mut walked = 0.0;
        for pair in self.nodes.windows(2) {
            let seg = pair[1] - pair[0];
            let seg_len = seg.length();
            if walked + seg_len >= arc && seg_len > 0.0 {
                return seg.normalized_or(self.heading);
            }
            walked += seg_len;
        }
        self.heading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_root() -> Root {
        let mut root = Root::new(0, None, Vector3::ZERO, Vector3::DOWN, 0.0);
        for i in 1..=4 {
            root.nodes.push(Vector3::new(0.0, 0.0, -(i as f64)));
        }
        root.length = 4.0;
        root
    }

    #[test]
    fn point_at_interpolates_along_the_axis() {
        let root = straight_root();
        let p = root.point_at(2.5);
        assert!((p.z - -2.5).abs() < 1e-12);
    }

    #[test]
    fn point_at_clamps_to_tip() {
        let root = straight_root();
        assert_eq!(root.point_at(100.0), root.tip());
    }

    #[test]
    fn direction_at_follows_the_segment() {
        let root = straight_root();
        let d = root.direction_at(1.5);
        assert!((d.z - -1.0).abs() < 1e-12);
    }

    #[test]
    fn fresh_root_reports_heading_and_base() {
        let root = Root::new(1, Some(0), Vector3::new(1.0, 0.0, 0.0), Vector3::DOWN, -2.0);
        assert_eq!(root.point_at(0.0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(root.direction_at(0.0), Vector3::DOWN);
        assert_eq!(root.length, 0.0);
    }
}
