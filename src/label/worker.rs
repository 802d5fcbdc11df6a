use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::collision::{FrameResult, resolve_labels};
use crate::config::Config;
use crate::graph::GraphNode;
use crate::text_metrics::FontMeasurer;

/// Snapshot of everything the label pass needs for one frame. Nodes
/// are copied in so the worker never sees a position mid-update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRequest {
    pub nodes: Vec<GraphNode>,
    pub global_scale: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

/// Single-slot mailbox guarded by a condvar. A newer request replaces
/// an unserviced older one, so the worker is never more than one frame
/// behind and never builds a backlog.
#[derive(Default)]
struct Mailbox {
    pending: Option<FrameRequest>,
    shutdown: bool,
}

/// Background label resolver. Owns its thread, its own text measurer
/// and a clone of the config; results come back over a channel and are
/// drained non-blockingly by the pipeline.
pub struct LabelWorker {
    shared: Arc<(Mutex<Mailbox>, Condvar)>,
    results: Receiver<FrameResult>,
    handle: Option<JoinHandle<()>>,
}

impl LabelWorker {
    pub fn spawn(config: Config) -> Self {
        let shared = Arc::new((Mutex::new(Mailbox::default()), Condvar::new()));
        let (result_tx, results) = mpsc::channel();
        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("label-worker".to_string())
            .spawn(move || run_worker(worker_shared, result_tx, config))
            .ok();
        if handle.is_none() {
            warn!("failed to spawn label worker thread");
        }
        Self {
            shared,
            results,
            handle,
        }
    }

    /// Queue a frame for resolution, superseding any request the
    /// worker has not picked up yet. Returns true when an unserviced
    /// request was replaced, meaning that request will never produce
    /// a result; callers tracking in-flight counts must not count the
    /// superseded frame.
    pub fn submit(&self, request: FrameRequest) -> bool {
        let (mailbox, condvar) = &*self.shared;
        let Ok(mut guard) = mailbox.lock() else {
            warn!("label worker mailbox poisoned, dropping frame");
            return true;
        };
        let replaced = guard.pending.is_some();
        if replaced {
            debug!("superseding unserviced frame request");
        }
        guard.pending = Some(request);
        condvar.notify_one();
        replaced
    }

    /// Drain completed frames without blocking. Returns the newest
    /// result together with how many results came off the channel, so
    /// callers can keep their in-flight count in step.
    pub fn try_recv_latest(&self) -> (Option<FrameResult>, usize) {
        let mut latest = None;
        let mut drained = 0usize;
        loop {
            match self.results.try_recv() {
                Ok(result) => {
                    latest = Some(result);
                    drained += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if latest.is_none() {
                        warn!("label worker disconnected");
                    }
                    break;
                }
            }
        }
        (latest, drained)
    }

    /// Block until the worker has answered every submitted request.
    /// Used by batch rendering, where frame staleness is not allowed.
    pub fn recv_blocking(&self) -> Option<FrameResult> {
        self.results.recv().ok()
    }
}

impl Drop for LabelWorker {
    fn drop(&mut self) {
        let (mailbox, condvar) = &*self.shared;
        if let Ok(mut guard) = mailbox.lock() {
            guard.shutdown = true;
            guard.pending = None;
            condvar.notify_one();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_worker(
    shared: Arc<(Mutex<Mailbox>, Condvar)>,
    results: Sender<FrameResult>,
    config: Config,
) {
    let mut measurer = FontMeasurer::new(&config.label.font_family);
    let (mailbox, condvar) = &*shared;
    loop {
        let request = {
            let Ok(mut guard) = mailbox.lock() else {
                return;
            };
            loop {
                if guard.shutdown {
                    return;
                }
                if let Some(request) = guard.pending.take() {
                    break request;
                }
                guard = match condvar.wait(guard) {
                    Ok(guard) => guard,
                    Err(_) => return,
                };
            }
        };
        let result = resolve_labels(
            &request.nodes,
            &mut measurer,
            request.global_scale,
            &config,
        );
        if results.send(result).is_err() {
            // Receiver dropped; nothing left to work for.
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request(scale: f32) -> FrameRequest {
        FrameRequest {
            nodes: vec![GraphNode {
                id: "m1".to_string(),
                title: "Heat".to_string(),
                year: None,
                popularity: 0.0,
                size: 10.0,
                color: None,
                degree: 0,
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
            }],
            global_scale: scale,
            canvas_width: 1200.0,
            canvas_height: 800.0,
        }
    }

    #[test]
    fn answers_a_submitted_frame() {
        let worker = LabelWorker::spawn(Config::default());
        worker.submit(request(2.0));
        let result = worker.recv_blocking().expect("worker result");
        assert!(result.visible_nodes.contains("m1"));
    }

    #[test]
    fn below_threshold_frame_comes_back_empty() {
        let worker = LabelWorker::spawn(Config::default());
        worker.submit(request(1.0));
        let result = worker.recv_blocking().expect("worker result");
        assert!(result.visible_nodes.is_empty());
        assert!(result.label_rects.is_empty());
    }

    #[test]
    fn try_recv_latest_keeps_only_the_newest() {
        let worker = LabelWorker::spawn(Config::default());
        for _ in 0..3 {
            worker.submit(request(2.0));
            // Give the worker time to service each one so several
            // results queue up on the channel.
            thread::sleep(Duration::from_millis(50));
        }
        let (latest, drained) = worker.try_recv_latest();
        assert!(latest.is_some());
        assert_eq!(drained, 3);
        let (again, drained_again) = worker.try_recv_latest();
        assert!(again.is_none());
        assert_eq!(drained_again, 0);
    }

    #[test]
    fn first_submit_reports_no_replacement() {
        let worker = LabelWorker::spawn(Config::default());
        assert!(!worker.submit(request(2.0)));
    }

    #[test]
    fn drop_joins_cleanly() {
        let worker = LabelWorker::spawn(Config::default());
        worker.submit(request(2.0));
        drop(worker);
    }
}
