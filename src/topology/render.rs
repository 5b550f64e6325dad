// Render layer
//
// Turns nodes, their layout, and the live particles into drawable
// primitives. Pure function of its inputs: the terminal canvas in
// ui::topology only paints what build_scene returns.

use super::{Layout, Node, Particle};
use crate::theme::activity_color;
use ratatui::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Node radius for zero activity, in container pixels
pub const MIN_NODE_RADIUS: f64 = 2.0;

/// Node radius for the busiest chain
pub const MAX_NODE_RADIUS: f64 = 7.0;

/// Labels longer than this (display columns) are truncated with an ellipsis
pub const MAX_LABEL_WIDTH: usize = 14;

/// Which node the user has selected / is hovering over
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Node opened in the detail view
    pub selected: Option<String>,
    /// Node under the list cursor
    pub hovered: Option<String>,
}

impl Selection {
    fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    fn is_hovered(&self, id: &str) -> bool {
        self.hovered.as_deref() == Some(id)
    }
}

/// Circle for one chain
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGlyph {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Color,
    pub is_hub: bool,
    pub selected: bool,
    pub hovered: bool,
}

/// Hub to satellite edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    pub satellite: String,
    pub from: (f64, f64),
    pub to: (f64, f64),
    /// Edge touches the selected or hovered node
    pub highlighted: bool,
}

/// A particle at its current point along an edge
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleDot {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: Color,
}

/// Everything the canvas draws for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub center: (f64, f64),
    /// Ring guide radii, innermost first
    pub rings: Vec<f64>,
    pub edges: Vec<EdgeLine>,
    pub nodes: Vec<NodeGlyph>,
    pub particles: Vec<ParticleDot>,
}

/// Linear interpolation along an edge, `t` clamped to `[0, 1]`
pub fn interpolate(start: (f64, f64), end: (f64, f64), t: f64) -> (f64, f64) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    (
        start.0 + (end.0 - start.0) * t,
        start.1 + (end.1 - start.1) * t,
    )
}

/// Node radius for an activity ratio in `[0, 1]`
pub fn node_radius(ratio: f64) -> f64 {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    MIN_NODE_RADIUS + (MAX_NODE_RADIUS - MIN_NODE_RADIUS) * ratio
}

/// Truncate `label` to `max_width` display columns, appending "…"
pub fn truncate_label(label: &str, max_width: usize) -> String {
    if label.width() <= max_width {
        return label.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in label.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Build the drawable scene
///
/// Nodes without a position are left out. Particles whose source or
/// destination has no position (e.g. the chain vanished in a refresh) are
/// skipped rather than drawn at a stale point.
pub fn build_scene(
    nodes: &[Node],
    layout: &Layout,
    particles: &[Particle],
    selection: &Selection,
) -> Scene {
    let (width, height) = layout.dimensions();
    let center = layout.center();
    let max_activity = nodes.iter().map(|n| n.activity).fold(0.0, f64::max);
    let hub_id = layout.hub();

    let glyphs: Vec<NodeGlyph> = nodes
        .iter()
        .filter_map(|node| {
            let pos = layout.get(&node.id)?;
            let ratio = if max_activity > 0.0 {
                node.activity / max_activity
            } else {
                0.0
            };
            Some(NodeGlyph {
                id: node.id.clone(),
                label: truncate_label(&node.name, MAX_LABEL_WIDTH),
                x: pos.x,
                y: pos.y,
                radius: node_radius(ratio),
                color: activity_color(ratio),
                is_hub: hub_id == Some(node.id.as_str()),
                selected: selection.is_selected(&node.id),
                hovered: selection.is_hovered(&node.id),
            })
        })
        .collect();

    let edges: Vec<EdgeLine> = match hub_id.and_then(|id| layout.get(id)) {
        Some(hub_pos) => layout
            .satellites()
            .iter()
            .filter_map(|sat| {
                let pos = layout.get(sat)?;
                let touches_focus = selection.is_selected(sat) || selection.is_hovered(sat);
                let hub_focused = hub_id.is_some_and(|h| selection.is_selected(h));
                Some(EdgeLine {
                    satellite: sat.clone(),
                    from: hub_pos.point(),
                    to: pos.point(),
                    highlighted: touches_focus || hub_focused,
                })
            })
            .collect(),
        None => Vec::new(),
    };

    let dots: Vec<ParticleDot> = particles
        .iter()
        .filter_map(|p| {
            let from = layout.get(&p.source)?;
            let to = layout.get(&p.destination)?;
            let (x, y) = interpolate(from.point(), to.point(), p.progress);
            Some(ParticleDot {
                id: p.id,
                x,
                y,
                size: p.size,
                color: p.color,
            })
        })
        .collect();

    Scene {
        width,
        height,
        center,
        rings: (0..layout.ring_count()).map(|r| layout.ring_radius(r)).collect(),
        edges,
        nodes: glyphs,
        particles: dots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;
    use crate::topology::particles::Direction;
    use crate::topology::{compute_positions, LayoutConfig};

    fn sample() -> (Vec<Node>, Layout) {
        let nodes = vec![Node::new("C", 5.0), Node::new("A", 1.0), Node::new("B", 0.0)];
        let layout = compute_positions(
            &nodes,
            400.0,
            400.0,
            &LayoutConfig::default().without_jitter(),
            &mut SequenceRandom::constant(0.5),
        );
        (nodes, layout)
    }

    fn particle(id: u64, source: &str, destination: &str, progress: f64) -> Particle {
        Particle {
            id,
            source: source.to_string(),
            destination: destination.to_string(),
            progress,
            speed: 1.0,
            size: 1.5,
            color: Color::White,
            direction: Direction::Outbound,
        }
    }

    #[test]
    fn test_interpolate() {
        let start = (50.0, 50.0);
        let end = (80.0, 30.0);
        assert_eq!(interpolate(start, end, 0.0), start);
        assert_eq!(interpolate(start, end, 0.5), (65.0, 40.0));
        assert_eq!(interpolate(start, end, 1.0), end);
        assert_eq!(interpolate(start, end, 1.7), end);
        assert_eq!(interpolate(start, end, f64::NAN), start);
    }

    #[test]
    fn test_scene_nodes_and_edges() {
        let (nodes, layout) = sample();
        let scene = build_scene(&nodes, &layout, &[], &Selection::default());

        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.edges.len(), 2);
        assert_eq!(scene.center, (200.0, 200.0));
        assert_eq!(scene.rings.len(), 1);

        let hub = scene.nodes.iter().find(|n| n.is_hub).unwrap();
        assert_eq!(hub.id, "C");
        assert_eq!(hub.radius, MAX_NODE_RADIUS);
        assert!(scene.edges.iter().all(|e| e.from == (200.0, 200.0)));

        let idle = scene.nodes.iter().find(|n| n.id == "B").unwrap();
        assert_eq!(idle.radius, MIN_NODE_RADIUS);
        assert_eq!(idle.color, activity_color(0.0));
    }

    #[test]
    fn test_all_zero_activity_is_neutral() {
        let nodes = vec![Node::new("x", 0.0), Node::new("y", 0.0)];
        let layout = compute_positions(
            &nodes,
            100.0,
            100.0,
            &LayoutConfig::default(),
            &mut SequenceRandom::constant(0.5),
        );
        let scene = build_scene(&nodes, &layout, &[], &Selection::default());
        assert!(scene.nodes.iter().all(|n| n.radius == MIN_NODE_RADIUS));
    }

    #[test]
    fn test_particles_interpolated_and_clamped() {
        let (nodes, layout) = sample();
        let particles = vec![particle(1, "C", "A", 0.5), particle(2, "A", "C", 3.0)];
        let scene = build_scene(&nodes, &layout, &particles, &Selection::default());

        let a = layout.get("A").unwrap();
        let mid = &scene.particles[0];
        assert!((mid.x - (200.0 + a.x) / 2.0).abs() < 1e-9);
        assert!((mid.y - (200.0 + a.y) / 2.0).abs() < 1e-9);

        let clamped = &scene.particles[1];
        assert!((clamped.x - 200.0).abs() < 1e-9);
        assert!((clamped.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_particles_with_missing_endpoint_skipped() {
        let (nodes, layout) = sample();
        let particles = vec![particle(1, "C", "gone", 0.2), particle(2, "C", "B", 0.2)];
        let scene = build_scene(&nodes, &layout, &particles, &Selection::default());
        assert_eq!(scene.particles.len(), 1);
        assert_eq!(scene.particles[0].id, 2);
    }

    #[test]
    fn test_selection_highlights() {
        let (nodes, layout) = sample();
        let selection = Selection {
            selected: Some("A".to_string()),
            hovered: None,
        };
        let scene = build_scene(&nodes, &layout, &[], &selection);

        assert!(scene.nodes.iter().find(|n| n.id == "A").unwrap().selected);
        let highlighted: Vec<_> = scene.edges.iter().filter(|e| e.highlighted).collect();
        assert_eq!(highlighted.len(), 1);
        assert_eq!(highlighted[0].satellite, "A");

        let hub_selected = Selection {
            selected: Some("C".to_string()),
            hovered: None,
        };
        let scene = build_scene(&nodes, &layout, &[], &hub_selected);
        assert!(scene.edges.iter().all(|e| e.highlighted));
    }

    #[test]
    fn test_inputs_not_mutated() {
        let (nodes, layout) = sample();
        let particles = vec![particle(1, "C", "A", 0.25)];
        let (nodes_before, layout_before, particles_before) =
            (nodes.clone(), layout.clone(), particles.clone());

        let _ = build_scene(&nodes, &layout, &particles, &Selection::default());
        assert_eq!(nodes, nodes_before);
        assert_eq!(layout, layout_before);
        assert_eq!(particles, particles_before);
    }

    #[test]
    fn test_empty_layout_empty_scene() {
        let scene = build_scene(&[], &Layout::default(), &[], &Selection::default());
        assert!(scene.nodes.is_empty());
        assert!(scene.edges.is_empty());
        assert!(scene.rings.is_empty());
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("C-Chain", 14), "C-Chain");
        assert_eq!(truncate_label("Dexalot Subnet Mainnet", 10), "Dexalot S…");
        assert_eq!(truncate_label("日本語チェーン", 7), "日本語…");
    }
}
