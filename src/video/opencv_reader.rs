use super::{VideoReader, VideoSource};
use anyhow::{anyhow, Result};
use opencv::{
    prelude::*,
    videoio::{VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT},
};
use std::path::Path;

pub struct OpencvReader {
    capture: VideoCapture,
}

impl OpencvReader {
    pub fn new(path: &str) -> Result<Self> {
        let capture = VideoCapture::from_file(path, CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(anyhow!("failed to open video file: {}", path));
        }

        let fps = capture.get(CAP_PROP_FPS)?;
        let stream_frames = capture.get(CAP_PROP_FRAME_COUNT)? as usize;
        tracing::debug!(
            "OpencvReader: opened {}, fps={:.2}, stream_frames={}",
            path,
            fps,
            stream_frames
        );

        Ok(Self { capture })
    }
}

impl VideoReader for OpencvReader {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let success = self.capture.read(&mut frame)?;
        if !success || frame.empty() {
            return Ok(None);
        }

        Ok(Some(frame))
    }
}

/// Production video source backed by opencv VideoCapture.
pub struct OpencvSource;

impl VideoSource for OpencvSource {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoReader>> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("non-utf8 video path: {:?}", path))?;
        Ok(Box::new(OpencvReader::new(path_str)?))
    }
}
