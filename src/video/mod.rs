pub mod opencv_reader;

use anyhow::Result;
use opencv::core::Mat;
use std::path::Path;

/// Sequential access to the frames of one opened video.
pub trait VideoReader: Send {
    /// Next frame in BGR order, or None at end of stream.
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

/// Seam for opening videos; a failure to open is a recoverable task-level
/// condition, never a pipeline-level one.
pub trait VideoSource: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoReader>>;
}
