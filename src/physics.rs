use std::collections::HashMap;

use crate::config::PhysicsConfig;
use crate::dataset::DatasetLink;
use crate::graph::{Forces, GraphNode};

/// Resolved link endpoints, looked up once at construction.
#[derive(Debug, Clone, Copy)]
struct Link {
    source: usize,
    target: usize,
    weight: f32,
}

/// Minimal force simulation for driving the demo renderer: pairwise
/// charge repulsion, spring links toward a rest distance, velocity
/// decay. Label-pass impulses are folded into velocities before each
/// integration step; positions are only ever moved here.
pub struct Simulation {
    pub nodes: Vec<GraphNode>,
    links: Vec<Link>,
    config: PhysicsConfig,
}

impl Simulation {
    pub fn new(nodes: Vec<GraphNode>, links: &[DatasetLink], config: PhysicsConfig) -> Self {
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.as_str(), idx))
            .collect();
        let links = links
            .iter()
            .filter_map(|link| {
                let source = *index.get(link.source.as_str())?;
                let target = *index.get(link.target.as_str())?;
                Some(Link {
                    source,
                    target,
                    weight: link.weight,
                })
            })
            .collect();
        Self {
            nodes,
            links,
            config,
        }
    }

    /// Resolved `(source, target)` index pairs, for painting links.
    pub fn link_endpoints(&self) -> Vec<(usize, usize)> {
        self.links
            .iter()
            .map(|link| (link.source, link.target))
            .collect()
    }

    /// One integration step. `forces` carries the label pass's
    /// repulsion impulses for this frame, if any.
    pub fn step(&mut self, forces: &Forces) {
        if !forces.is_empty() {
            forces.apply_to(&mut self.nodes);
        }
        self.apply_charge();
        self.apply_links();
        self.integrate();
    }

    fn apply_charge(&mut self) {
        let strength = self.config.charge_strength;
        for i in 0..self.nodes.len() {
            for j in (i + 1)..self.nodes.len() {
                let dx = self.nodes[j].x - self.nodes[i].x;
                let dy = self.nodes[j].y - self.nodes[i].y;
                let dist_sq = (dx * dx + dy * dy).max(1.0);
                let dist = dist_sq.sqrt();
                // Negative strength repels, matching the charge model.
                let force = strength / dist_sq;
                let fx = (dx / dist) * force;
                let fy = (dy / dist) * force;
                self.nodes[i].vx += fx;
                self.nodes[i].vy += fy;
                self.nodes[j].vx -= fx;
                self.nodes[j].vy -= fy;
            }
        }
    }

    fn apply_links(&mut self) {
        let rest = self.config.link_distance;
        let strength = self.config.link_strength;
        for link in &self.links {
            let dx = self.nodes[link.target].x - self.nodes[link.source].x;
            let dy = self.nodes[link.target].y - self.nodes[link.source].y;
            let dist = (dx * dx + dy * dy).sqrt().max(1.0);
            let displacement = (dist - rest) * strength * link.weight;
            let fx = (dx / dist) * displacement;
            let fy = (dy / dist) * displacement;
            self.nodes[link.source].vx += fx;
            self.nodes[link.source].vy += fy;
            self.nodes[link.target].vx -= fx;
            self.nodes[link.target].vy -= fy;
        }
    }

    fn integrate(&mut self) {
        let decay = self.config.velocity_decay;
        let dt = self.config.time_step;
        for node in &mut self.nodes {
            node.vx *= decay;
            node.vy *= decay;
            node.x += node.vx * dt;
            node.y += node.vy * dt;
        }
    }
}
