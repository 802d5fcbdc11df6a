use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Rect, wrap_title};
use crate::config::Config;
use crate::graph::GraphNode;
use crate::text_metrics::MeasureText;

/// Sizing detail kept alongside each rect for the debug overlay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelDebug {
    pub lines: usize,
    pub text_height: f32,
    pub top_padding: f32,
    pub bottom_padding: f32,
    pub total_height: f32,
}

/// Screen-space box of one node's wrapped title, recomputed from
/// scratch every frame. Geometry is a pure function of the node's
/// current position and size, the title, the zoom scale and the font
/// metrics; there is no identity across frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRect {
    pub id: String,
    /// Index of the owning node in the frame's node slice.
    pub node_index: usize,
    pub rect: Rect,
    pub lines: Vec<String>,
    pub collides: bool,
    pub node_collision: bool,
    pub label_collision: bool,
    /// Anchor used as the origin for repulsion direction, not for
    /// drawing.
    pub center_x: f32,
    pub center_y: f32,
    /// False when text measurement failed; the label is dropped from
    /// the visible set for this frame.
    pub measured: bool,
    pub debug: LabelDebug,
}

/// Compute one rect per node at the given zoom scale, together with
/// the union bounds used to seed the frame's quadtree. Font metrics
/// are divided by the scale so labels keep constant apparent size on
/// screen.
pub fn build_label_rects<M: MeasureText>(
    nodes: &[GraphNode],
    measurer: &mut M,
    global_scale: f32,
    config: &Config,
) -> (Vec<LabelRect>, Option<Rect>) {
    let font_size = config.label.font_size / global_scale;
    let line_height = config.label.line_height / global_scale;
    let h_padding = config.label.padding_horizontal / global_scale;
    let top_padding = config.label.padding_top / global_scale;
    let bottom_padding = config.label.padding_bottom / global_scale;
    let max_width = config.label.max_width / global_scale;
    let vertical_offset = config.label.vertical_offset / global_scale;

    let mut bounds: Option<Rect> = None;
    let rects = nodes
        .iter()
        .enumerate()
        .map(|(node_index, node)| {
            let measured = measure_one(
                node,
                measurer,
                font_size,
                max_width,
                config.label.max_lines,
            );
            let Some((lines, max_line_width)) = measured else {
                return degraded_rect(node, node_index);
            };

            let text_height = lines.len() as f32 * line_height;
            let total_width = max_line_width + h_padding * 2.0;
            let total_height = text_height + top_padding + bottom_padding;
            let radius = node.radius(&config.node);

            let rect = Rect::new(
                node.x - total_width / 2.0,
                node.y + radius + vertical_offset - top_padding,
                total_width,
                total_height,
            );
            match bounds.as_mut() {
                Some(bounds) => bounds.union_with(&rect),
                None => bounds = Some(rect),
            }

            LabelRect {
                id: node.id.clone(),
                node_index,
                rect,
                collides: false,
                node_collision: false,
                label_collision: false,
                center_x: node.x,
                center_y: node.y + radius + vertical_offset + text_height / 2.0,
                measured: true,
                debug: LabelDebug {
                    lines: lines.len(),
                    text_height,
                    top_padding,
                    bottom_padding,
                    total_height,
                },
                lines,
            }
        })
        .collect();

    (rects, bounds)
}

fn measure_one<M: MeasureText>(
    node: &GraphNode,
    measurer: &mut M,
    font_size: f32,
    max_width: f32,
    max_lines: usize,
) -> Option<(Vec<String>, f32)> {
    let lines = match wrap_title(measurer, &node.title, font_size, max_width, max_lines) {
        Ok(lines) => lines,
        Err(err) => {
            warn!(node = %node.id, %err, "text wrap failed, hiding label this frame");
            return None;
        }
    };
    let mut max_line_width = 0.0f32;
    for line in &lines {
        match measurer.measure_text(line, font_size) {
            Ok(width) => max_line_width = max_line_width.max(width),
            Err(err) => {
                warn!(node = %node.id, %err, "text measurement failed, hiding label this frame");
                return None;
            }
        }
    }
    Some((lines, max_line_width))
}

/// Placeholder for a node whose title could not be measured: zero
/// geometry at the node position, flagged as colliding so every later
/// stage skips it, keeping the one-rect-per-node invariant.
fn degraded_rect(node: &GraphNode, node_index: usize) -> LabelRect {
    LabelRect {
        id: node.id.clone(),
        node_index,
        rect: Rect::new(node.x, node.y, 0.0, 0.0),
        lines: Vec::new(),
        collides: true,
        node_collision: false,
        label_collision: false,
        center_x: node.x,
        center_y: node.y,
        measured: false,
        debug: LabelDebug::default(),
    }
}
