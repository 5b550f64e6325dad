// Chain topology model
//
// Nodes are built from the fetched chain list and replaced wholesale on
// every refresh. A Topology bundles the node list with its computed layout
// so the animation loop always reads one consistent snapshot.

pub mod layout;
pub mod particles;
pub mod render;

pub use layout::{compute_positions, Layout, LayoutConfig};
pub use particles::{AnimationLoop, Particle, ParticleConfig};
pub use render::{build_scene, Scene, Selection};

use crate::api::ChainInfo;
use crate::random::RandomSource;

/// One chain in the topology
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Chain id
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional logo reference (shown in the inspector)
    pub logo_uri: Option<String>,
    /// Validator count if known
    pub validators: Option<u64>,
    /// TPS-like activity value, always finite and >= 0
    pub activity: f64,
    /// Timestamp of the activity sample
    pub sampled_at: Option<i64>,
}

impl Node {
    /// Node with just an id and activity (names default to the id)
    #[cfg(test)]
    pub fn new(id: impl Into<String>, activity: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            logo_uri: None,
            validators: None,
            activity: sanitize_activity(Some(activity)),
            sampled_at: None,
        }
    }

    pub fn from_chain(chain: &ChainInfo) -> Self {
        Self {
            id: chain.chain_id.clone(),
            name: chain.display_name().to_string(),
            logo_uri: chain.chain_logo_uri.clone(),
            validators: chain.validator_count(),
            activity: sanitize_activity(chain.tps_value()),
            sampled_at: chain.tps.as_ref().and_then(|t| t.timestamp),
        }
    }
}

/// Missing, non-finite, or negative activity collapses to zero
pub fn sanitize_activity(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Convert a chain list into nodes, dropping duplicate chain ids
///
/// The first occurrence of an id wins; order is preserved.
pub fn nodes_from_chains(chains: &[ChainInfo]) -> Vec<Node> {
    let mut seen = std::collections::HashSet::new();
    chains
        .iter()
        .filter(|c| !c.chain_id.is_empty() && seen.insert(c.chain_id.as_str()))
        .map(Node::from_chain)
        .collect()
}

/// Index of the hub node: greatest activity, first node on ties
pub fn select_hub(nodes: &[Node]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, node) in nodes.iter().enumerate() {
        match best {
            Some((_, activity)) if node.activity <= activity => {}
            _ => best = Some((idx, node.activity)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Nodes plus their layout, swapped in as one value
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub nodes: Vec<Node>,
    pub layout: Layout,
}

impl Topology {
    /// Lay out `nodes` inside a `width` x `height` container
    pub fn build(
        nodes: Vec<Node>,
        width: f64,
        height: f64,
        config: &LayoutConfig,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let layout = compute_positions(&nodes, width, height, config, rng);
        Self { nodes, layout }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hub node, if any
    pub fn hub(&self) -> Option<&Node> {
        let hub_id = self.layout.hub()?;
        self.nodes.iter().find(|n| n.id == hub_id)
    }

    /// Satellite ids in layout order
    pub fn satellites(&self) -> &[String] {
        self.layout.satellites()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Largest activity value across nodes (0 when empty)
    pub fn max_activity(&self) -> f64 {
        self.nodes.iter().map(|n| n.activity).fold(0.0, f64::max)
    }
}
