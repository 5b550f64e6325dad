// Radial position calculator
//
// Places the hub chain at the container center and spreads the remaining
// chains over concentric rings. Pure: the only input besides the nodes and
// container size is the injected RandomSource used for angular jitter.

use super::{select_hub, Node};
use crate::random::RandomSource;
use std::collections::HashMap;
use std::f64::consts::TAU;

/// Satellites per ring before a new ring is opened
pub const DEFAULT_RING_CAPACITY: usize = 8;

/// Innermost ring radius as a fraction of the smaller container dimension
pub const MIN_RADIUS_FRACTION: f64 = 0.22;

/// Outermost ring radius as a fraction of the smaller container dimension
pub const MAX_RADIUS_FRACTION: f64 = 0.42;

/// Total angular jitter window in radians (centered on the slot angle)
pub const DEFAULT_JITTER_RADIANS: f64 = 0.12;

/// Tunables for the radial layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub ring_capacity: usize,
    pub min_radius_fraction: f64,
    pub max_radius_fraction: f64,
    /// Width of the jitter window; 0 disables jitter
    pub jitter_radians: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ring_capacity: DEFAULT_RING_CAPACITY,
            min_radius_fraction: MIN_RADIUS_FRACTION,
            max_radius_fraction: MAX_RADIUS_FRACTION,
            jitter_radians: DEFAULT_JITTER_RADIANS,
        }
    }
}

#[cfg(test)]
impl LayoutConfig {
    /// Same layout with jitter switched off
    pub fn without_jitter(self) -> Self {
        Self {
            jitter_radians: 0.0,
            ..self
        }
    }
}

/// Computed placement of one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Polar angle around the center, in `[0, 2π)`
    pub angle: f64,
    /// Distance from the center
    pub distance: f64,
    /// Ring index; None for the hub
    pub ring: Option<usize>,
}

impl Position {
    pub fn point(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Node id to position mapping for one container size
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    positions: HashMap<String, Position>,
    hub: Option<String>,
    satellites: Vec<String>,
    ring_count: usize,
    min_radius: f64,
    max_radius: f64,
    width: f64,
    height: f64,
}

impl Layout {
    pub fn get(&self, id: &str) -> Option<&Position> {
        self.positions.get(id)
    }

    pub fn hub(&self) -> Option<&str> {
        self.hub.as_deref()
    }

    /// Satellite ids in placement order
    pub fn satellites(&self) -> &[String] {
        &self.satellites
    }

    pub fn ring_count(&self) -> usize {
        self.ring_count
    }

    pub fn min_radius(&self) -> f64 {
        self.min_radius
    }

    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Container size the layout was computed for
    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Radius of ring `ring` (meaningful for `ring < ring_count`)
    pub fn ring_radius(&self, ring: usize) -> f64 {
        ring_radius(ring, self.ring_count, self.min_radius, self.max_radius)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Position)> {
        self.positions.iter()
    }
}

/// Number of rings needed for `satellites` nodes at `capacity` per ring
pub fn ring_count(satellites: usize, capacity: usize) -> usize {
    satellites.div_ceil(capacity.max(1))
}

fn ring_radius(ring: usize, rings: usize, min_radius: f64, max_radius: f64) -> f64 {
    if rings <= 1 {
        return min_radius;
    }
    let t = ring.min(rings - 1) as f64 / (rings - 1) as f64;
    min_radius + (max_radius - min_radius) * t
}

/// Compute positions for `nodes` in a `width` x `height` container
///
/// The hub (see [`select_hub`]) sits at the exact center. Satellites keep
/// their input order and fill rings of `config.ring_capacity`; odd rings
/// are rotated by half a slot so nodes don't line up radially. Each
/// satellite then gets `config.jitter_radians`-wide jitter from `rng`.
///
/// An empty node list, or a container with a non-positive or non-finite
/// dimension, yields an empty layout.
pub fn compute_positions(
    nodes: &[Node],
    width: f64,
    height: f64,
    config: &LayoutConfig,
    rng: &mut dyn RandomSource,
) -> Layout {
    let valid_size = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
    let Some(hub_idx) = select_hub(nodes).filter(|_| valid_size) else {
        return Layout {
            width: width.max(0.0),
            height: height.max(0.0),
            ..Layout::default()
        };
    };

    let (cx, cy) = (width / 2.0, height / 2.0);
    let smaller = width.min(height);
    let min_radius = smaller * config.min_radius_fraction;
    let max_radius = (smaller * config.max_radius_fraction).max(min_radius);
    let capacity = config.ring_capacity.max(1);

    let hub = &nodes[hub_idx];
    let satellites: Vec<&Node> = nodes
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != hub_idx)
        .map(|(_, node)| node)
        .collect();
    let rings = ring_count(satellites.len(), capacity);

    let mut positions = HashMap::with_capacity(nodes.len());
    positions.insert(
        hub.id.clone(),
        Position {
            x: cx,
            y: cy,
            angle: 0.0,
            distance: 0.0,
            ring: None,
        },
    );

    for (ring, members) in satellites.chunks(capacity).enumerate() {
        let radius = ring_radius(ring, rings, min_radius, max_radius);
        let slot = TAU / members.len() as f64;
        let ring_offset = if ring % 2 == 1 { slot / 2.0 } else { 0.0 };

        for (i, node) in members.iter().enumerate() {
            let jitter = if config.jitter_radians > 0.0 {
                (rng.next_f64() - 0.5) * config.jitter_radians
            } else {
                0.0
            };
            let angle = normalize_angle(i as f64 * slot + ring_offset + jitter);

            positions.insert(
                node.id.clone(),
                Position {
                    x: cx + radius * angle.cos(),
                    y: cy + radius * angle.sin(),
                    angle,
                    distance: radius,
                    ring: Some(ring),
                },
            );
        }
    }

    Layout {
        positions,
        hub: Some(hub.id.clone()),
        satellites: satellites.iter().map(|n| n.id.clone()).collect(),
        ring_count: rings,
        min_radius,
        max_radius,
        width,
        height,
    }
}

/// Fold an angle into `[0, 2π)`
pub fn normalize_angle(angle: f64) -> f64 {
    let folded = angle.rem_euclid(TAU);
    // rem_euclid of a tiny negative value rounds up to exactly 2π
    if folded >= TAU {
        0.0
    } else {
        folded
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SequenceRandom};
    use proptest::prelude::*;
    use std::f64::consts::PI;

    /// Angle difference folded into `[0, π]`
    fn angular_distance(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(TAU);
        if d > PI {
            TAU - d
        } else {
            d
        }
    }

    fn nodes(n: usize) -> Vec<Node> {
        (0..n).map(|i| Node::new(format!("chain-{i}"), i as f64)).collect()
    }

    fn no_jitter() -> LayoutConfig {
        LayoutConfig::default().without_jitter()
    }

    #[test]
    fn test_three_chain_scenario() {
        let nodes = vec![Node::new("C", 5.0), Node::new("A", 1.0), Node::new("B", 0.0)];
        let mut rng = SequenceRandom::constant(0.5);
        let layout = compute_positions(&nodes, 400.0, 400.0, &no_jitter(), &mut rng);

        assert_eq!(layout.hub(), Some("C"));
        let hub = layout.get("C").unwrap();
        assert_eq!((hub.x, hub.y), (200.0, 200.0));
        assert_eq!(hub.ring, None);

        let min_radius = 400.0 * MIN_RADIUS_FRACTION;
        assert_eq!(layout.ring_count(), 1);

        let a = layout.get("A").unwrap();
        assert_eq!(a.ring, Some(0));
        assert!(angular_distance(a.angle, 0.0) < 1e-9);
        assert!((a.distance - min_radius).abs() < 1e-9);
        assert!((a.x - (200.0 + min_radius)).abs() < 1e-9);
        assert!((a.y - 200.0).abs() < 1e-9);

        let b = layout.get("B").unwrap();
        assert_eq!(b.ring, Some(0));
        assert!(angular_distance(b.angle, PI) < 1e-9);
        assert!((b.x - (200.0 - min_radius)).abs() < 1e-9);
        assert!((b.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_nodes_empty_layout() {
        let mut rng = SequenceRandom::constant(0.5);
        let layout = compute_positions(&[], 400.0, 300.0, &LayoutConfig::default(), &mut rng);
        assert!(layout.is_empty());
        assert_eq!(layout.hub(), None);
        assert_eq!(layout.ring_count(), 0);
    }

    #[test]
    fn test_degenerate_container_empty_layout() {
        let mut rng = SequenceRandom::constant(0.5);
        for (w, h) in [(0.0, 100.0), (100.0, -1.0), (f64::NAN, 100.0)] {
            let layout = compute_positions(&nodes(4), w, h, &LayoutConfig::default(), &mut rng);
            assert!(layout.is_empty(), "expected empty layout for {w}x{h}");
        }
    }

    #[test]
    fn test_single_node_is_hub_only() {
        let mut rng = SequenceRandom::constant(0.5);
        let layout = compute_positions(&nodes(1), 80.0, 60.0, &LayoutConfig::default(), &mut rng);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout.ring_count(), 0);
        assert_eq!(layout.get("chain-0").unwrap().point(), (40.0, 30.0));
    }

    #[test]
    fn test_rings_split_at_capacity() {
        // chain-19 is the hub, 19 satellites -> 3 rings of 8, 8, 3
        let mut rng = SequenceRandom::constant(0.5);
        let layout = compute_positions(&nodes(20), 500.0, 500.0, &no_jitter(), &mut rng);
        assert_eq!(layout.hub(), Some("chain-19"));
        assert_eq!(layout.ring_count(), 3);

        let per_ring = |r: usize| layout.iter().filter(|(_, p)| p.ring == Some(r)).count();
        assert_eq!(per_ring(0), 8);
        assert_eq!(per_ring(1), 8);
        assert_eq!(per_ring(2), 3);

        assert!((layout.ring_radius(0) - layout.min_radius()).abs() < 1e-9);
        assert!((layout.ring_radius(2) - layout.max_radius()).abs() < 1e-9);
        let mid = (layout.min_radius() + layout.max_radius()) / 2.0;
        assert!((layout.ring_radius(1) - mid).abs() < 1e-9);
    }

    #[test]
    fn test_odd_rings_are_offset_half_slot() {
        let mut rng = SequenceRandom::constant(0.5);
        let layout = compute_positions(&nodes(17), 500.0, 500.0, &no_jitter(), &mut rng);

        // First satellite of ring 1 is chain-8
        let first_outer = layout.get("chain-8").unwrap();
        assert_eq!(first_outer.ring, Some(1));
        assert!(angular_distance(first_outer.angle, TAU / 16.0) < 1e-9);

        let first_inner = layout.get("chain-0").unwrap();
        assert!(angular_distance(first_inner.angle, 0.0) < 1e-9);
    }

    #[test]
    fn test_jitter_uses_random_source() {
        let config = LayoutConfig::default();
        let nodes = vec![Node::new("hub", 9.0), Node::new("s", 1.0)];

        let mut high = SequenceRandom::constant(0.75);
        let layout = compute_positions(&nodes, 400.0, 400.0, &config, &mut high);
        let angle = layout.get("s").unwrap().angle;
        assert!((angle - 0.25 * config.jitter_radians).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_seed_fixed_output() {
        let config = LayoutConfig::default();
        let a = compute_positions(&nodes(30), 640.0, 480.0, &config, &mut SeededRandom::seeded(11));
        let b = compute_positions(&nodes(30), 640.0, 480.0, &config, &mut SeededRandom::seeded(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_radius_uses_smaller_dimension() {
        let mut rng = SequenceRandom::constant(0.5);
        let layout = compute_positions(&nodes(3), 1000.0, 200.0, &no_jitter(), &mut rng);
        assert!((layout.min_radius() - 200.0 * MIN_RADIUS_FRACTION).abs() < 1e-9);
        assert_eq!(layout.center(), (500.0, 100.0));
    }

    #[test]
    fn test_angular_distance() {
        assert!((angular_distance(0.1, TAU - 0.1) - 0.2).abs() < 1e-9);
        assert!((angular_distance(PI, 0.0) - PI).abs() < 1e-9);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The hub always lands on the exact container center
        #[test]
        fn prop_hub_at_center(
            n in 1usize..60,
            width in 1.0f64..4000.0,
            height in 1.0f64..4000.0,
            seed in any::<u64>(),
        ) {
            let nodes = nodes(n);
            let layout = compute_positions(
                &nodes, width, height, &LayoutConfig::default(), &mut SeededRandom::seeded(seed),
            );
            let hub = layout.hub().unwrap();
            let pos = layout.get(hub).unwrap();
            prop_assert_eq!(pos.x, width / 2.0);
            prop_assert_eq!(pos.y, height / 2.0);
            prop_assert_eq!(layout.len(), n);
        }

        /// ceil(n/k) rings, every satellite radius inside [min, max]
        #[test]
        fn prop_rings_and_radius_bounds(
            satellites in 0usize..80,
            capacity in 1usize..12,
            width in 10.0f64..2000.0,
            height in 10.0f64..2000.0,
            seed in any::<u64>(),
        ) {
            let config = LayoutConfig { ring_capacity: capacity, ..LayoutConfig::default() };
            let nodes = nodes(satellites + 1);
            let layout = compute_positions(
                &nodes, width, height, &config, &mut SeededRandom::seeded(seed),
            );

            prop_assert_eq!(layout.ring_count(), satellites.div_ceil(capacity));
            let eps = 1e-9;
            for id in layout.satellites() {
                let pos = layout.get(id).unwrap();
                let (cx, cy) = layout.center();
                let dist = ((pos.x - cx).powi(2) + (pos.y - cy).powi(2)).sqrt();
                prop_assert!(dist >= layout.min_radius() - eps * width.max(height));
                prop_assert!(dist <= layout.max_radius() + eps * width.max(height));
                prop_assert!(pos.distance >= layout.min_radius() - eps);
                prop_assert!(pos.distance <= layout.max_radius() + eps * layout.max_radius());
                prop_assert!((0.0..TAU).contains(&pos.angle));
            }
        }
    }
}
