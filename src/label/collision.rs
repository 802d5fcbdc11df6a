use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{LabelRect, QuadTree, Rect, build_label_rects};
use crate::config::Config;
use crate::graph::{Forces, GraphNode};
use crate::text_metrics::MeasureText;

/// Outcome of one frame's label pass: which labels may be painted, the
/// full rect array with collision flags, aggregate counters, and the
/// repulsion impulses for the physics engine to integrate. Plain data;
/// the worker sends it across the channel as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameResult {
    pub visible_nodes: HashSet<String>,
    pub label_rects: Vec<LabelRect>,
    pub node_collisions: usize,
    pub label_collisions: usize,
    pub forces: Forces,
}

impl FrameResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Per-frame collision pass.
///
/// Build: one rect per node plus running union bounds. Node check:
/// each rect against every other node's circle; hits push the circle's
/// node away from the label anchor. Label check: a fresh quadtree over
/// the union bounds, greedy first-come-first-accepted in input order;
/// an overlap excludes both sides and repels their owning nodes apart.
/// Below the zoom threshold the whole pass short-circuits to an empty
/// result.
///
/// The function is pure in its inputs: identical nodes, scale and
/// config produce identical visibility, geometry, counters and forces.
pub fn resolve_labels<M: MeasureText>(
    nodes: &[GraphNode],
    measurer: &mut M,
    global_scale: f32,
    config: &Config,
) -> FrameResult {
    if nodes.is_empty() || global_scale < config.zoom.label_threshold {
        return FrameResult::empty();
    }

    let (mut label_rects, bounds) = build_label_rects(nodes, measurer, global_scale, config);
    let mut forces = Forces::new();
    let mut node_collisions = 0usize;
    let mut label_collisions = 0usize;

    // Label-vs-node circles.
    for rect in label_rects.iter_mut() {
        if !rect.measured {
            continue;
        }
        for other in nodes {
            if other.id == rect.id {
                continue;
            }
            let radius = other.radius(&config.node);
            if !circle_hits_rect(other.x, other.y, radius, &rect.rect) {
                continue;
            }
            rect.collides = true;
            rect.node_collision = true;
            node_collisions += 1;
            push_apart(
                &mut forces,
                &other.id,
                other.x - rect.center_x,
                other.y - rect.center_y,
                config,
            );
        }
    }

    // Label-vs-label through the quadtree, greedy in input order.
    let mut visible_nodes: HashSet<String> = HashSet::new();
    let Some(bounds) = bounds else {
        return FrameResult {
            visible_nodes,
            label_rects,
            node_collisions,
            label_collisions,
            forces,
        };
    };
    let mut tree = QuadTree::new(config.quadtree.capacity);
    tree.reset(bounds);

    for idx in 0..label_rects.len() {
        if label_rects[idx].collides {
            continue;
        }
        let overlapping = tree.query(&label_rects[idx].rect);
        if overlapping.is_empty() {
            visible_nodes.insert(label_rects[idx].id.clone());
            tree.insert(idx, label_rects[idx].rect);
            continue;
        }

        label_rects[idx].collides = true;
        label_rects[idx].label_collision = true;
        for other_idx in overlapping {
            // The earlier label was accepted before this overlap was
            // known; exclusion is final within the pass.
            visible_nodes.remove(&label_rects[other_idx].id);
            label_rects[other_idx].collides = true;
            label_rects[other_idx].label_collision = true;
            label_collisions += 2;

            let dx = label_rects[other_idx].center_x - label_rects[idx].center_x;
            let dy = label_rects[other_idx].center_y - label_rects[idx].center_y;
            let other_id = label_rects[other_idx].id.clone();
            push_apart(&mut forces, &other_id, dx, dy, config);
            let own_id = label_rects[idx].id.clone();
            push_apart(&mut forces, &own_id, -dx, -dy, config);
        }
    }

    FrameResult {
        visible_nodes,
        label_rects,
        node_collisions,
        label_collisions,
        forces,
    }
}

/// Closest-point-on-rect to circle-center test; strictly inside the
/// radius counts, touching does not.
fn circle_hits_rect(cx: f32, cy: f32, radius: f32, rect: &Rect) -> bool {
    let closest_x = cx.clamp(rect.x, rect.x + rect.width);
    let closest_y = cy.clamp(rect.y, rect.y + rect.height);
    let dx = cx - closest_x;
    let dy = cy - closest_y;
    dx * dx + dy * dy < radius * radius
}

/// Inverse-distance repulsion along `(dx, dy)`, floored at the
/// configured minimum distance so near-coincident anchors cannot blow
/// up the impulse. Coincident anchors produce no push at all: there is
/// no direction to push in.
fn push_apart(forces: &mut Forces, node_id: &str, dx: f32, dy: f32, config: &Config) {
    let distance = (dx * dx + dy * dy).sqrt();
    if distance <= 0.0 {
        return;
    }
    let force = config.repulsion.strength / config.repulsion.min_distance.max(distance);
    forces.add_impulse(node_id, (dx / distance) * force, (dy / distance) * force);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::CharTableMeasurer;

    fn node(id: &str, title: &str, x: f32, y: f32, size: f32) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            title: title.to_string(),
            year: None,
            popularity: 0.0,
            size,
            color: None,
            degree: 0,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    fn resolve(nodes: &[GraphNode], scale: f32, config: &Config) -> FrameResult {
        let mut measurer = CharTableMeasurer;
        resolve_labels(nodes, &mut measurer, scale, config)
    }

    #[test]
    fn below_zoom_threshold_short_circuits() {
        let nodes = vec![node("m1", "Heat", 0.0, 0.0, 10.0)];
        let config = Config::default();
        let result = resolve(&nodes, 1.0, &config);
        assert!(result.visible_nodes.is_empty());
        assert!(result.label_rects.is_empty());
        assert_eq!(result.node_collisions, 0);
        assert_eq!(result.label_collisions, 0);
        assert!(result.forces.is_empty());
    }

    #[test]
    fn single_node_is_always_visible() {
        let nodes = vec![node("m1", "Heat", 0.0, 0.0, 10.0)];
        let config = Config::default();
        let result = resolve(&nodes, 2.0, &config);
        assert!(result.visible_nodes.contains("m1"));
        assert_eq!(result.label_rects.len(), 1);
        assert!(!result.label_rects[0].collides);
        assert_eq!(result.node_collisions, 0);
        assert_eq!(result.label_collisions, 0);
    }

    #[test]
    fn distant_labels_stay_visible() {
        let nodes = vec![
            node("m1", "Heat", 0.0, 0.0, 10.0),
            node("m2", "Ronin", 500.0, 500.0, 10.0),
        ];
        let config = Config::default();
        let result = resolve(&nodes, 2.0, &config);
        assert_eq!(result.visible_nodes.len(), 2);
        assert!(result.label_rects.iter().all(|rect| !rect.collides));
    }

    #[test]
    fn overlapping_pair_excludes_both_and_counts_two() {
        // Radius 10 exactly: size 40 at scale 0.5.
        let mut config = Config::default();
        config.node.size_scale = 0.5;
        let nodes = vec![
            node("m1", "A", 0.0, 0.0, 40.0),
            node("m2", "B", 5.0, 0.0, 40.0),
        ];
        let result = resolve(&nodes, 2.0, &config);
        assert!(!result.visible_nodes.contains("m1"));
        assert!(!result.visible_nodes.contains("m2"));
        assert!(result.label_collisions >= 2);
        let rects = &result.label_rects;
        assert!(rects[0].label_collision && rects[0].collides);
        assert!(rects[1].label_collision && rects[1].collides);
        // Both owning nodes get pushed apart along x.
        let (fx_a, _) = result.forces.impulse("m1").expect("impulse on m1");
        let (fx_b, _) = result.forces.impulse("m2").expect("impulse on m2");
        assert!(fx_a < 0.0 && fx_b > 0.0);
    }

    #[test]
    fn label_over_foreign_node_is_hidden_and_repels_it() {
        let mut config = Config::default();
        config.node.size_scale = 0.5;
        // m2 sits right where m1's label lands (below m1's circle).
        let nodes = vec![
            node("m1", "A", 0.0, 0.0, 40.0),
            node("m2", "B", 0.0, 14.0, 40.0),
        ];
        let result = resolve(&nodes, 2.0, &config);
        let m1_rect = result
            .label_rects
            .iter()
            .find(|rect| rect.id == "m1")
            .unwrap();
        assert!(m1_rect.node_collision);
        assert!(!result.visible_nodes.contains("m1"));
        assert!(result.node_collisions >= 1);
        assert!(result.forces.impulse("m2").is_some());
    }

    #[test]
    fn resolution_is_idempotent_for_identical_inputs() {
        let nodes = vec![
            node("m1", "The Quick Brown Fox", 0.0, 0.0, 30.0),
            node("m2", "Jumps Over", 12.0, 3.0, 25.0),
            node("m3", "The Lazy Dog", 300.0, 300.0, 20.0),
        ];
        let config = Config::default();
        let first = resolve(&nodes, 2.0, &config);
        let second = resolve(&nodes, 2.0, &config);
        assert_eq!(first.visible_nodes, second.visible_nodes);
        assert_eq!(first.node_collisions, second.node_collisions);
        assert_eq!(first.label_collisions, second.label_collisions);
        for (a, b) in first.label_rects.iter().zip(second.label_rects.iter()) {
            assert_eq!(a.rect, b.rect);
            assert_eq!(a.collides, b.collides);
        }
    }

    #[test]
    fn earlier_label_blocks_later_regardless_of_size() {
        // Greedy input-order rule: acceptance has no popularity bias.
        // Zero-size circles keep the node phase out of the picture.
        let nodes = vec![
            node("small", "A", 0.0, 0.0, 0.0),
            node("big", "B", 2.0, 0.0, 0.0),
        ];
        let config = Config::default();
        let result = resolve(&nodes, 2.0, &config);
        // Rects at these positions overlap; both end up excluded.
        assert!(result.visible_nodes.is_empty());
        assert_eq!(result.label_collisions, 2);
    }
}
