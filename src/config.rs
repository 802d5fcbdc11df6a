use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    pub font_size: f32,
    pub font_family: String,
    pub line_height: f32,
    pub max_width: f32,
    pub max_lines: usize,
    pub max_title_chars: usize,
    pub padding_horizontal: f32,
    pub padding_top: f32,
    pub padding_bottom: f32,
    pub vertical_offset: f32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            font_family: "Arial, sans-serif".to_string(),
            line_height: 14.0,
            max_width: 100.0,
            max_lines: 2,
            max_title_chars: 15,
            padding_horizontal: 4.0,
            padding_top: 2.0,
            padding_bottom: 2.0,
            vertical_offset: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub size_scale: f32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self { size_scale: 0.15 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomConfig {
    pub label_threshold: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            label_threshold: 1.5,
            min_scale: 0.1,
            max_scale: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepulsionConfig {
    pub strength: f32,
    pub min_distance: f32,
}

impl Default for RepulsionConfig {
    fn default() -> Self {
        Self {
            strength: 2.0,
            min_distance: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadTreeConfig {
    pub capacity: usize,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self { capacity: 4 }
    }
}

/// Parameters for the demo integrator in the CLI. The label engine
/// itself never reads these; positions belong to the host simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub charge_strength: f32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub velocity_decay: f32,
    pub time_step: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            charge_strength: -30.0,
            link_distance: 100.0,
            link_strength: 0.05,
            velocity_decay: 0.6,
            time_step: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub label: LabelConfig,
    pub node: NodeConfig,
    pub zoom: ZoomConfig,
    pub repulsion: RepulsionConfig,
    pub quadtree: QuadTreeConfig,
    pub physics: PhysicsConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LabelConfigFile {
    font_size: Option<f32>,
    font_family: Option<String>,
    line_height: Option<f32>,
    max_width: Option<f32>,
    max_lines: Option<usize>,
    max_title_chars: Option<usize>,
    padding_horizontal: Option<f32>,
    padding_top: Option<f32>,
    padding_bottom: Option<f32>,
    vertical_offset: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ZoomConfigFile {
    label_threshold: Option<f32>,
    min_scale: Option<f32>,
    max_scale: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RepulsionConfigFile {
    strength: Option<f32>,
    min_distance: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PhysicsConfigFile {
    charge_strength: Option<f32>,
    link_distance: Option<f32>,
    link_strength: Option<f32>,
    velocity_decay: Option<f32>,
    time_step: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    label: Option<LabelConfigFile>,
    node_size_scale: Option<f32>,
    zoom: Option<ZoomConfigFile>,
    repulsion: Option<RepulsionConfigFile>,
    quadtree_capacity: Option<usize>,
    physics: Option<PhysicsConfigFile>,
    width: Option<f32>,
    height: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(label) = parsed.label {
        if let Some(v) = label.font_size {
            config.label.font_size = v;
        }
        if let Some(v) = label.font_family {
            config.label.font_family = v;
        }
        if let Some(v) = label.line_height {
            config.label.line_height = v;
        }
        if let Some(v) = label.max_width {
            config.label.max_width = v;
        }
        if let Some(v) = label.max_lines {
            config.label.max_lines = v.max(1);
        }
        if let Some(v) = label.max_title_chars {
            config.label.max_title_chars = v;
        }
        if let Some(v) = label.padding_horizontal {
            config.label.padding_horizontal = v;
        }
        if let Some(v) = label.padding_top {
            config.label.padding_top = v;
        }
        if let Some(v) = label.padding_bottom {
            config.label.padding_bottom = v;
        }
        if let Some(v) = label.vertical_offset {
            config.label.vertical_offset = v;
        }
    }
    if let Some(v) = parsed.node_size_scale {
        config.node.size_scale = v;
    }
    if let Some(zoom) = parsed.zoom {
        if let Some(v) = zoom.label_threshold {
            config.zoom.label_threshold = v;
        }
        if let Some(v) = zoom.min_scale {
            config.zoom.min_scale = v;
        }
        if let Some(v) = zoom.max_scale {
            config.zoom.max_scale = v;
        }
    }
    if let Some(repulsion) = parsed.repulsion {
        if let Some(v) = repulsion.strength {
            config.repulsion.strength = v;
        }
        if let Some(v) = repulsion.min_distance {
            config.repulsion.min_distance = v.max(f32::EPSILON);
        }
    }
    if let Some(v) = parsed.quadtree_capacity {
        config.quadtree.capacity = v.max(1);
    }
    if let Some(physics) = parsed.physics {
        if let Some(v) = physics.charge_strength {
            config.physics.charge_strength = v;
        }
        if let Some(v) = physics.link_distance {
            config.physics.link_distance = v;
        }
        if let Some(v) = physics.link_strength {
            config.physics.link_strength = v;
        }
        if let Some(v) = physics.velocity_decay {
            config.physics.velocity_decay = v;
        }
        if let Some(v) = physics.time_step {
            config.physics.time_step = v;
        }
    }
    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tuning_constants() {
        let config = Config::default();
        assert_eq!(config.zoom.label_threshold, 1.5);
        assert_eq!(config.node.size_scale, 0.15);
        assert_eq!(config.label.max_lines, 2);
        assert_eq!(config.quadtree.capacity, 4);
    }

    #[test]
    fn load_config_without_path_uses_defaults() {
        let config = load_config(None).expect("default config");
        assert_eq!(config.label.font_size, 12.0);
    }
}
