// Prediction invoker: hands a directory of cropped face images to the
// external artifact-detection service and interprets its completion.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// One invocation of the external prediction service.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    /// Directory containing the written frame images; the service scans it
    /// and writes the report file into it.
    pub data_dir: PathBuf,
    pub predictions_file_name: String,
    /// File the service's own log output is redirected to.
    pub log_path: PathBuf,
}

/// External prediction capability: synchronous, blocking, out-of-process.
/// The returned Result is the checked success/failure of the invocation;
/// a failure is a reported, non-fatal task-level error.
pub trait PredictionService: Send + Sync {
    fn predict(&self, request: &PredictionRequest) -> Result<()>;
}

/// Report produced by the external service, in its JSON key naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub model_name: String,
    pub predictions: Vec<Prediction>,
    pub seconds_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub sample: String,
    pub probability: String,
}

pub fn load_report(path: &Path) -> Result<PredictionReport> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read prediction report: {:?}", path))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse prediction report: {:?}", path))
}

/// Production service: runs the containerized model over the task's output
/// directory. The container scans /data for PNG frames, writes the report
/// next to them, and logs to stdout/stderr, which we redirect into the
/// task's log file.
pub struct DockerPredictionService {
    image: String,
    helper_dir: PathBuf,
    timeout: Option<Duration>,
}

impl DockerPredictionService {
    pub fn new(image: String, helper_dir: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            image,
            helper_dir,
            timeout,
        }
    }
}

impl PredictionService for DockerPredictionService {
    fn predict(&self, request: &PredictionRequest) -> Result<()> {
        // docker -v needs absolute host paths.
        let helper_dir = self
            .helper_dir
            .canonicalize()
            .with_context(|| format!("helper directory not found: {:?}", self.helper_dir))?;

        let log_file = File::create(&request.log_path)
            .with_context(|| format!("failed to create prediction log: {:?}", request.log_path))?;
        let err_file = log_file.try_clone()?;

        let mut child = Command::new("docker")
            .arg("run")
            .arg("--rm")
            .arg("-v")
            .arg(format!("{}:/data", request.data_dir.display()))
            .arg("-v")
            .arg(format!("{}:/helper", helper_dir.display()))
            .arg(&self.image)
            .arg("python")
            .arg("/helper/warp_helper.py")
            .arg(&request.predictions_file_name)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(err_file))
            .spawn()
            .with_context(|| format!("failed to start prediction container {}", self.image))?;

        let status = match self.timeout {
            Some(limit) => {
                let deadline = Instant::now() + limit;
                loop {
                    if let Some(status) = child.try_wait()? {
                        break status;
                    }
                    if Instant::now() >= deadline {
                        child.kill().ok();
                        child.wait().ok();
                        bail!(
                            "prediction container exceeded timeout of {}s",
                            limit.as_secs()
                        );
                    }
                    thread::sleep(Duration::from_millis(200));
                }
            }
            None => child.wait()?,
        };

        if !status.success() {
            bail!("prediction container exited with {}", status);
        }

        Ok(())
    }
}
