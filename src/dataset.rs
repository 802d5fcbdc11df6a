use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::graph::GraphNode;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dataset has no nodes")]
    Empty,
    #[error("link references unknown node {0:?}")]
    DanglingLink(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub popularity: f32,
    pub size: f32,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetLink {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub value: f32,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<DatasetNode>,
    pub links: Vec<DatasetLink>,
}

impl GraphData {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path)?;
        let data: GraphData = serde_json::from_str(&contents)?;
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<(), DatasetError> {
        if self.nodes.is_empty() {
            return Err(DatasetError::Empty);
        }
        let ids: HashMap<&str, ()> = self.nodes.iter().map(|n| (n.id.as_str(), ())).collect();
        for link in &self.links {
            if !ids.contains_key(link.source.as_str()) {
                return Err(DatasetError::DanglingLink(link.source.clone()));
            }
            if !ids.contains_key(link.target.as_str()) {
                return Err(DatasetError::DanglingLink(link.target.clone()));
            }
        }
        Ok(())
    }

    /// Build simulation nodes: degree derived from incident links,
    /// initial positions spread on a deterministic spiral so the first
    /// frames are stable across runs.
    pub fn into_graph_nodes(self) -> Vec<GraphNode> {
        let mut degrees: HashMap<String, usize> = HashMap::new();
        for link in &self.links {
            *degrees.entry(link.source.clone()).or_insert(0) += 1;
            *degrees.entry(link.target.clone()).or_insert(0) += 1;
        }

        self.nodes
            .into_iter()
            .enumerate()
            .map(|(idx, node)| {
                let angle = idx as f32 * 2.399_963; // golden angle
                let spread = 18.0 * (idx as f32).sqrt();
                GraphNode {
                    degree: degrees.get(&node.id).copied().unwrap_or(0),
                    x: spread * angle.cos(),
                    y: spread * angle.sin(),
                    vx: 0.0,
                    vy: 0.0,
                    id: node.id,
                    title: node.title,
                    year: node.year,
                    popularity: node.popularity,
                    size: node.size,
                    color: node.color,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> GraphData {
        serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": "m1", "title": "Heat", "year": 1995, "popularity": 61.2, "size": 42.0},
                    {"id": "m2", "title": "The Insider", "size": 30.0},
                    {"id": "m3", "title": "Collateral", "size": 35.0}
                ],
                "links": [
                    {"source": "m1", "target": "m2", "actors": ["Al Pacino"], "value": 1.0, "weight": 2.0},
                    {"source": "m1", "target": "m3"}
                ]
            }"#,
        )
        .expect("payload parses")
    }

    #[test]
    fn degree_counts_incident_links() {
        let nodes = payload().into_graph_nodes();
        assert_eq!(nodes[0].degree, 2);
        assert_eq!(nodes[1].degree, 1);
        assert_eq!(nodes[2].degree, 1);
    }

    #[test]
    fn initial_positions_are_distinct() {
        let nodes = payload().into_graph_nodes();
        assert!((nodes[1].x - nodes[2].x).abs() > 1e-3 || (nodes[1].y - nodes[2].y).abs() > 1e-3);
    }

    #[test]
    fn dangling_link_is_rejected() {
        let data: GraphData = serde_json::from_str(
            r#"{"nodes": [{"id": "m1", "title": "Heat", "size": 10.0}],
                "links": [{"source": "m1", "target": "missing"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            data.validate(),
            Err(DatasetError::DanglingLink(_))
        ));
    }
}
