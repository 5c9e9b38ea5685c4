use std::path::PathBuf;

/// One video plus its processing parameters, the unit of distribution.
/// Built once per dataset item and consumed by exactly one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    pub input_file_path: PathBuf,
    pub output_dir: PathBuf,
    pub frame_limit: usize,
    pub relative_padding: f32,
    pub log_file_name: String,
    pub predictions_file_name: String,
}

impl WorkItem {
    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(&self.log_file_name)
    }

    pub fn predictions_path(&self) -> PathBuf {
        self.output_dir.join(&self.predictions_file_name)
    }
}

/// Queue value delivered to workers: either a task or the termination marker
/// telling the receiving worker to stop pulling further work.
pub enum TaskMessage {
    Task(WorkItem),
    Shutdown,
}

/// What happened to a single frame of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Written,
    SkippedExisting,
    SkippedNoFace,
    SkippedMultipleFaces,
}

impl FrameOutcome {
    /// Warn outcomes disable the prediction phase for the whole task run;
    /// a file-already-exists skip does not.
    pub fn is_warn(self) -> bool {
        matches!(self, Self::SkippedNoFace | Self::SkippedMultipleFaces)
    }
}

/// Per-task frame accounting. Holds the invariant
/// `written + skipped() == read` for every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub read: usize,
    pub written: usize,
    pub warned: usize,
}

impl TaskStats {
    pub fn skipped(&self) -> usize {
        self.read - self.written
    }
}

/// How the prediction phase of a task run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOutcome {
    /// The external service was invoked and reported success.
    Invoked,
    /// At least one warn outcome occurred; no partial face set is ever
    /// submitted to the model.
    GatedByWarnings,
    /// Log file and predictions file both exist from an earlier run.
    AlreadyDone,
    /// The external service was invoked and reported failure.
    Failed,
}

/// Result of one task run. `prediction` is None when the task ended before
/// the prediction phase (e.g. the capture could not be opened).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRun {
    pub stats: TaskStats,
    pub prediction: Option<PredictionOutcome>,
}

impl TaskRun {
    /// A run that ended early with nothing processed.
    pub fn aborted() -> Self {
        Self {
            stats: TaskStats::default(),
            prediction: None,
        }
    }
}
