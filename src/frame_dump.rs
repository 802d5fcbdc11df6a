use crate::graph::GraphNode;
use crate::label::FrameResult;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct FrameDump {
    pub global_scale: f32,
    pub visible_nodes: Vec<String>,
    pub node_collisions: usize,
    pub label_collisions: usize,
    pub nodes: Vec<NodeDump>,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub title: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub degree: usize,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<String>,
    pub visible: bool,
    pub node_collision: bool,
    pub label_collision: bool,
    pub measured: bool,
}

impl FrameDump {
    pub fn from_frame(nodes: &[GraphNode], frame: &FrameResult, global_scale: f32) -> Self {
        let node_dumps = nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                title: node.title.clone(),
                x: node.x,
                y: node.y,
                vx: node.vx,
                vy: node.vy,
                size: node.size,
                degree: node.degree,
            })
            .collect();

        let labels = frame
            .label_rects
            .iter()
            .map(|rect| LabelDump {
                id: rect.id.clone(),
                x: rect.rect.x,
                y: rect.rect.y,
                width: rect.rect.width,
                height: rect.rect.height,
                lines: rect.lines.clone(),
                visible: frame.visible_nodes.contains(&rect.id),
                node_collision: rect.node_collision,
                label_collision: rect.label_collision,
                measured: rect.measured,
            })
            .collect();

        let mut visible_nodes: Vec<String> = frame.visible_nodes.iter().cloned().collect();
        visible_nodes.sort();

        FrameDump {
            global_scale,
            visible_nodes,
            node_collisions: frame.node_collisions,
            label_collisions: frame.label_collisions,
            nodes: node_dumps,
            labels,
        }
    }
}

pub fn write_frame_dump(
    path: &Path,
    nodes: &[GraphNode],
    frame: &FrameResult,
    global_scale: f32,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = FrameDump::from_frame(nodes, frame, global_scale);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
