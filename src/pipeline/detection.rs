use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat, Vector},
    imgproc,
    objdetect::CascadeClassifier,
    prelude::*,
};
use std::path::{Path, PathBuf};

/// External face-detection capability: one RGB image in, zero or more
/// bounding boxes out, no persisted state. Implementations are owned by a
/// single worker and need not be Sync.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<core::Rect>>;
}

/// Creates one detector instance per worker thread; model loading happens
/// inside the worker, never on the coordinator.
pub trait FaceDetectorProvider: Send + Sync {
    fn create(&self) -> Result<Box<dyn FaceDetector>>;
}

/// Frontal face detector backed by an opencv Haar cascade.
pub struct CascadeFaceDetector {
    classifier: CascadeClassifier,
}

impl CascadeFaceDetector {
    pub fn new(model_path: &Path) -> Result<Self> {
        let path_str = model_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("non-utf8 model path: {:?}", model_path))?;
        let classifier = CascadeClassifier::new(path_str)
            .with_context(|| format!("failed to load face cascade: {:?}", model_path))?;
        Ok(Self { classifier })
    }
}

impl FaceDetector for CascadeFaceDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<core::Rect>> {
        let mut gray = Mat::default();
        imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_RGB2GRAY)?;

        let mut faces = Vector::<core::Rect>::new();
        self.classifier.detect_multi_scale_def(&gray, &mut faces)?;

        Ok(faces.into_iter().collect())
    }
}

/// Provider for the production cascade detector.
pub struct CascadeFaceDetectorProvider {
    model_path: PathBuf,
}

impl CascadeFaceDetectorProvider {
    pub fn new(model_path: PathBuf) -> Self {
        Self { model_path }
    }
}

impl FaceDetectorProvider for CascadeFaceDetectorProvider {
    fn create(&self) -> Result<Box<dyn FaceDetector>> {
        Ok(Box::new(CascadeFaceDetector::new(&self.model_path)?))
    }
}
