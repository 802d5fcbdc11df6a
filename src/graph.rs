use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::NodeConfig;

/// A movie node in the force-simulated network. Positions are owned by
/// the host physics engine and change every frame; the label engine
/// reads them and emits velocity impulses through [`Forces`], never
/// writing `x`/`y` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub popularity: f32,
    pub size: f32,
    #[serde(default)]
    pub color: Option<String>,
    /// Incident-link count, derived once at dataset load.
    #[serde(default)]
    pub degree: usize,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub vx: f32,
    #[serde(default)]
    pub vy: f32,
}

impl GraphNode {
    pub fn radius(&self, node_config: &NodeConfig) -> f32 {
        (self.size / 2.0) * node_config.size_scale
    }
}

/// Accumulated repulsion impulses keyed by node id.
///
/// The collision resolver pushes `(dx, dy)` velocity deltas here
/// instead of mutating node velocities in place, so the one piece of
/// state shared with the physics engine crosses the boundary as plain
/// data. Hosts either integrate the impulses themselves or call
/// [`Forces::apply_to`], which adds to velocity only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Forces {
    impulses: HashMap<String, (f32, f32)>,
}

impl Forces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_impulse(&mut self, node_id: &str, dx: f32, dy: f32) {
        let entry = self
            .impulses
            .entry(node_id.to_string())
            .or_insert((0.0, 0.0));
        entry.0 += dx;
        entry.1 += dy;
    }

    pub fn impulse(&self, node_id: &str) -> Option<(f32, f32)> {
        self.impulses.get(node_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.impulses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.impulses.len()
    }

    /// Add every accumulated impulse into the matching node's velocity.
    pub fn apply_to(&self, nodes: &mut [GraphNode]) {
        for node in nodes.iter_mut() {
            if let Some((dx, dy)) = self.impulses.get(&node.id) {
                node.vx += dx;
                node.vy += dy;
            }
        }
    }
}
