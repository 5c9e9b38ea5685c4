// Run coordinator: validates startup inputs, builds and enqueues all work
// items, then spawns the log aggregator and the worker pool and joins them.
//
// Shutdown ordering: workers observe one termination marker each; the log
// shutdown sentinel is sent only after every worker has been joined, so no
// late events are lost.

use crate::dataset;
use crate::logsink::{aggregator_worker, LogMessage, LogSender, TracingDestination};
use crate::pipeline::detection::FaceDetectorProvider;
use crate::pipeline::distributor::TaskQueue;
use crate::pipeline::task::{build_work_item, TaskConfig};
use crate::pipeline::worker::warp_worker;
use crate::predict::PredictionService;
use crate::video::VideoSource;
use anyhow::{bail, Context, Result};
use crossbeam::channel;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

pub struct PipelineConfig {
    pub dataset_root: PathBuf,
    pub annotations_path: PathBuf,
    pub output_root: PathBuf,
    pub worker_count: usize,
    pub task: TaskConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub tasks_enqueued: usize,
}

pub fn run_pipeline(
    config: &PipelineConfig,
    video: Arc<dyn VideoSource>,
    detectors: Arc<dyn FaceDetectorProvider>,
    predictor: Arc<dyn PredictionService>,
) -> Result<RunSummary> {
    // Fatal, pre-queue validation.
    if !config.dataset_root.is_dir() {
        bail!(
            "invalid dataset root, no such directory: {:?}",
            config.dataset_root
        );
    }
    if !config.annotations_path.is_file() {
        bail!(
            "invalid annotations path, no such file: {:?}",
            config.annotations_path
        );
    }
    if !config.output_root.is_dir() {
        bail!(
            "invalid output root, no such directory: {:?}",
            config.output_root
        );
    }
    if config.worker_count == 0 {
        bail!("worker count must be positive");
    }
    if config.task.frame_limit == 0 {
        bail!("frame limit must be positive");
    }
    if !(0.0..1.0).contains(&config.task.relative_padding) {
        bail!(
            "relative padding must be in [0, 1), got {}",
            config.task.relative_padding
        );
    }

    let dataset_root = config
        .dataset_root
        .canonicalize()
        .context("failed to resolve dataset root")?;
    let output_root = config
        .output_root
        .canonicalize()
        .context("failed to resolve output root")?;

    let items = dataset::load_dataset(&dataset_root, &config.annotations_path)?;
    tracing::info!("loaded {} dataset items", items.len());

    let queue = TaskQueue::unbounded();
    for item in &items {
        queue.enqueue(build_work_item(
            &dataset_root,
            &output_root,
            item,
            &config.task,
        )?);
    }
    // One marker per worker, after all items, so every worker exits cleanly.
    queue.close(config.worker_count);

    let (log_tx, log_rx) = channel::unbounded();
    let aggregator = thread::spawn(move || {
        let mut destination = TracingDestination;
        aggregator_worker(log_rx, &mut destination);
    });

    let mut handles = Vec::with_capacity(config.worker_count);
    for worker_index in 0..config.worker_count {
        let tasks = queue.receiver();
        let log = LogSender::new(format!("warp_worker_{worker_index}"), log_tx.clone());
        let video = video.clone();
        let detectors = detectors.clone();
        let predictor = predictor.clone();
        handles.push(thread::spawn(move || {
            // Model loading happens inside the worker thread.
            let detector = match detectors.create() {
                Ok(detector) => detector,
                Err(e) => {
                    log.error(format!("unable to create face detector: {e:#}"));
                    return;
                }
            };
            warp_worker(tasks, log, video, detector, predictor);
        }));
    }

    for handle in handles {
        if handle.join().is_err() {
            tracing::error!("warp worker panicked");
        }
    }

    // All producers have stopped; the aggregator may now shut down.
    let _ = log_tx.send(LogMessage::Shutdown);
    if aggregator.join().is_err() {
        tracing::error!("log aggregator panicked");
    }

    Ok(RunSummary {
        tasks_enqueued: items.len(),
    })
}
