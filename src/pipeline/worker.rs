// Warp worker: pulls tasks from the shared queue until its termination
// marker arrives. Workers share nothing but the task queue, the log channel,
// and the stateless prediction service handle.

use crate::logsink::LogSender;
use crate::pipeline::detection::FaceDetector;
use crate::pipeline::frames::run_task;
use crate::pipeline::types::{PredictionOutcome, TaskMessage};
use crate::predict::PredictionService;
use crate::video::VideoSource;
use crossbeam::channel::Receiver;
use std::sync::Arc;

pub fn warp_worker(
    tasks: Receiver<TaskMessage>,
    log: LogSender,
    video: Arc<dyn VideoSource>,
    mut detector: Box<dyn FaceDetector>,
    predictor: Arc<dyn PredictionService>,
) {
    log.info("started");

    loop {
        let task = match tasks.recv() {
            Ok(TaskMessage::Task(task)) => task,
            Ok(TaskMessage::Shutdown) => break,
            // Producer gone without markers; treat as termination.
            Err(_) => break,
        };

        let run = run_task(
            &task,
            video.as_ref(),
            detector.as_mut(),
            predictor.as_ref(),
            &log,
        );

        if run.prediction == Some(PredictionOutcome::Invoked) {
            log.info(format!(
                "finished prediction, approximate tasks remaining: {}",
                tasks.len()
            ));
        }
    }

    log.info("finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logsink::LogMessage;
    use crate::pipeline::distributor::TaskQueue;
    use crate::pipeline::types::WorkItem;
    use crate::video::VideoReader;
    use anyhow::{anyhow, Result};
    use crossbeam::channel;
    use opencv::core::{Mat, Rect};
    use std::path::{Path, PathBuf};
    use std::thread;
    use std::time::Duration;

    struct FailingSource;

    impl VideoSource for FailingSource {
        fn open(&self, path: &Path) -> Result<Box<dyn VideoReader>> {
            Err(anyhow!("cannot open {:?}", path))
        }
    }

    struct NoopDetector;

    impl FaceDetector for NoopDetector {
        fn detect(&mut self, _frame: &Mat) -> Result<Vec<Rect>> {
            Ok(Vec::new())
        }
    }

    struct NoopPredictor;

    impl PredictionService for NoopPredictor {
        fn predict(&self, _request: &crate::predict::PredictionRequest) -> Result<()> {
            Ok(())
        }
    }

    fn item(out_root: &Path, name: &str) -> WorkItem {
        WorkItem {
            input_file_path: PathBuf::from(format!("/videos/{name}.mp4")),
            output_dir: out_root.join(format!("{name}_warp")),
            frame_limit: 100,
            relative_padding: 0.1,
            log_file_name: "warp.log".to_string(),
            predictions_file_name: "warp.json".to_string(),
        }
    }

    fn spawn_workers(
        queue: &TaskQueue,
        count: usize,
    ) -> (channel::Receiver<usize>, channel::Receiver<LogMessage>) {
        let (done_tx, done_rx) = channel::unbounded();
        let (log_tx, log_rx) = channel::unbounded();

        for index in 0..count {
            let tasks = queue.receiver();
            let log = LogSender::new(format!("warp_worker_{index}"), log_tx.clone());
            let done = done_tx.clone();
            thread::spawn(move || {
                warp_worker(
                    tasks,
                    log,
                    Arc::new(FailingSource),
                    Box::new(NoopDetector),
                    Arc::new(NoopPredictor),
                );
                let _ = done.send(index);
            });
        }

        (done_rx, log_rx)
    }

    #[test]
    fn n_markers_terminate_n_workers() {
        let dir = tempfile::tempdir().unwrap();
        let queue = TaskQueue::unbounded();
        queue.enqueue(item(dir.path(), "a"));
        queue.enqueue(item(dir.path(), "b"));
        queue.close(3);

        let (done, _log_rx) = spawn_workers(&queue, 3);

        for _ in 0..3 {
            done.recv_timeout(Duration::from_secs(5))
                .expect("worker did not terminate");
        }
    }

    #[test]
    fn missing_marker_starves_a_worker() {
        let queue = TaskQueue::unbounded();
        queue.close(1);

        let (done, _log_rx) = spawn_workers(&queue, 2);

        // One worker gets the single marker, the other blocks on the queue.
        done.recv_timeout(Duration::from_secs(5))
            .expect("first worker did not terminate");
        assert!(done.recv_timeout(Duration::from_millis(500)).is_err());

        // Release the starved worker so the thread does not outlive the test.
        queue.close(1);
        done.recv_timeout(Duration::from_secs(5))
            .expect("released worker did not terminate");
    }

    #[test]
    fn announces_startup_and_shutdown() {
        let queue = TaskQueue::unbounded();
        queue.close(1);
        let (log_tx, log_rx) = channel::unbounded();
        let log = LogSender::new("warp_worker_0", log_tx);

        warp_worker(
            queue.receiver(),
            log,
            Arc::new(FailingSource),
            Box::new(NoopDetector),
            Arc::new(NoopPredictor),
        );

        let mut messages = Vec::new();
        while let Ok(LogMessage::Event(event)) = log_rx.try_recv() {
            messages.push(event.message);
        }
        assert_eq!(messages.first().map(String::as_str), Some("started"));
        assert_eq!(messages.last().map(String::as_str), Some("finished"));
    }
}
