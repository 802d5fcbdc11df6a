use tracing::debug;

use crate::config::Config;
use crate::graph::GraphNode;
use crate::label::{FrameRequest, FrameResult, LabelWorker, resolve_labels};
use crate::text_metrics::FontMeasurer;

/// Running totals across the frames a pipeline has processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub frames: usize,
    pub node_collisions: usize,
    pub label_collisions: usize,
}

enum Backend {
    Inline(Box<FontMeasurer>),
    Worker(LabelWorker),
}

/// Per-frame driver for the label pass. Inline mode resolves
/// synchronously on the caller's thread; worker mode hands a node
/// snapshot to the background thread and serves whatever result has
/// come back so far, so painted labels may trail positions by one
/// frame but the caller never blocks.
pub struct FramePipeline {
    config: Config,
    backend: Backend,
    last_result: FrameResult,
    pending: usize,
    stats: FrameStats,
}

impl FramePipeline {
    pub fn inline(config: Config) -> Self {
        let measurer = Box::new(FontMeasurer::new(&config.label.font_family));
        Self {
            config,
            backend: Backend::Inline(measurer),
            last_result: FrameResult::empty(),
            pending: 0,
            stats: FrameStats::default(),
        }
    }

    pub fn with_worker(config: Config) -> Self {
        let worker = LabelWorker::spawn(config.clone());
        Self {
            config,
            backend: Backend::Worker(worker),
            last_result: FrameResult::empty(),
            pending: 0,
            stats: FrameStats::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Advance one frame. Returns the result the caller should paint
    /// with; in worker mode this is the newest completed frame, which
    /// may lag the submitted snapshot by one.
    pub fn on_frame(
        &mut self,
        nodes: &[GraphNode],
        global_scale: f32,
        canvas_width: f32,
        canvas_height: f32,
    ) -> &FrameResult {
        match &mut self.backend {
            Backend::Inline(measurer) => {
                self.last_result =
                    resolve_labels(nodes, measurer.as_mut(), global_scale, &self.config);
                self.record(global_scale);
            }
            Backend::Worker(worker) => {
                let (received, drained) = worker.try_recv_latest();
                self.pending = self.pending.saturating_sub(drained);
                let replaced = worker.submit(FrameRequest {
                    nodes: nodes.to_vec(),
                    global_scale,
                    canvas_width,
                    canvas_height,
                });
                // A superseded request never answers; only a submit
                // that landed in an empty mailbox adds to the count.
                if !replaced {
                    self.pending += 1;
                }
                if let Some(result) = received {
                    self.last_result = result;
                    self.record(global_scale);
                }
            }
        }
        &self.last_result
    }

    /// Wait out any in-flight worker frame so the final paint uses
    /// up-to-date geometry. No-op in inline mode.
    pub fn settle(&mut self) -> &FrameResult {
        if let Backend::Worker(worker) = &mut self.backend {
            while self.pending > 0 {
                match worker.recv_blocking() {
                    Some(result) => {
                        self.pending -= 1;
                        self.last_result = result;
                    }
                    None => break,
                }
            }
        }
        &self.last_result
    }

    pub fn last_result(&self) -> &FrameResult {
        &self.last_result
    }

    pub fn is_visible(&self, node_id: &str) -> bool {
        self.last_result.visible_nodes.contains(node_id)
    }

    pub fn label_rect(&self, node_id: &str) -> Option<&crate::label::LabelRect> {
        self.last_result
            .label_rects
            .iter()
            .find(|rect| rect.id == node_id)
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    fn record(&mut self, global_scale: f32) {
        self.stats.frames += 1;
        self.stats.node_collisions += self.last_result.node_collisions;
        self.stats.label_collisions += self.last_result.label_collisions;
        debug!(
            frame = self.stats.frames,
            scale = global_scale,
            visible = self.last_result.visible_nodes.len(),
            node_collisions = self.last_result.node_collisions,
            label_collisions = self.last_result.label_collisions,
            "frame resolved"
        );
    }
}
