// Task distributor: one unbounded FIFO feeding the worker pool.

use crate::pipeline::types::{TaskMessage, WorkItem};
use crossbeam::channel::{self, Receiver, Sender};

/// Single producer side of the task queue. Workers hold cloned receivers and
/// race on the same FIFO; enqueue order is preserved, cross-worker
/// consumption order is not.
pub struct TaskQueue {
    tx: Sender<TaskMessage>,
    rx: Receiver<TaskMessage>,
}

impl TaskQueue {
    pub fn unbounded() -> Self {
        let (tx, rx) = channel::unbounded();
        Self { tx, rx }
    }

    pub fn enqueue(&self, item: WorkItem) {
        // The queue owns a receiver, so the channel cannot be disconnected.
        let _ = self.tx.send(TaskMessage::Task(item));
    }

    /// Enqueues exactly one termination marker per worker, after all items.
    /// Fewer markers than workers would starve the pool; more would be
    /// harmlessly dropped, so the count must match the worker count.
    pub fn close(&self, worker_count: usize) {
        for _ in 0..worker_count {
            let _ = self.tx.send(TaskMessage::Shutdown);
        }
    }

    pub fn receiver(&self) -> Receiver<TaskMessage> {
        self.rx.clone()
    }

    /// Best-effort snapshot of the queue depth; only a progress diagnostic,
    /// never a correctness-relevant value under concurrent drain.
    pub fn approx_len(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(name: &str) -> WorkItem {
        WorkItem {
            input_file_path: PathBuf::from(format!("/videos/{name}.mp4")),
            output_dir: PathBuf::from(format!("/out/{name}_warp")),
            frame_limit: 100,
            relative_padding: 0.1,
            log_file_name: "warp.log".to_string(),
            predictions_file_name: "warp.json".to_string(),
        }
    }

    #[test]
    fn delivers_items_before_markers_in_enqueue_order() {
        let queue = TaskQueue::unbounded();
        queue.enqueue(item("a"));
        queue.enqueue(item("b"));
        queue.enqueue(item("c"));
        queue.close(2);

        assert_eq!(queue.approx_len(), 5);

        let rx = queue.receiver();
        for expected in ["a", "b", "c"] {
            match rx.recv().unwrap() {
                TaskMessage::Task(work) => {
                    assert_eq!(work.input_file_path, PathBuf::from(format!("/videos/{expected}.mp4")));
                }
                TaskMessage::Shutdown => panic!("marker before items"),
            }
        }
        assert!(matches!(rx.recv().unwrap(), TaskMessage::Shutdown));
        assert!(matches!(rx.recv().unwrap(), TaskMessage::Shutdown));
        assert_eq!(queue.approx_len(), 0);
    }
}
