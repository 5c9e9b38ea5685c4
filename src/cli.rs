use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Root directory of the video dataset
    #[arg(long, env = "FACE_WARP_DATASET_ROOT")]
    pub dataset_root: PathBuf,

    /// Path to the dataset annotations JSON
    #[arg(long, env = "FACE_WARP_ANNOTATIONS")]
    pub annotations: PathBuf,

    /// Root directory for output artifacts
    #[arg(long, env = "FACE_WARP_OUTPUT_ROOT")]
    pub output_root: PathBuf,

    /// Number of warp workers
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// Maximum number of frames to process per video
    #[arg(long, default_value_t = 100)]
    pub frame_limit: usize,

    /// Face box padding relative to frame dimensions, in [0, 1)
    #[arg(long, default_value_t = 0.1)]
    pub relative_padding: f32,

    /// Per-task log file name
    #[arg(long, default_value = "warp.log")]
    pub log_file_name: String,

    /// Per-task predictions file name
    #[arg(long, default_value = "warp.json")]
    pub predictions_file_name: String,

    /// Path to the face cascade model XML
    #[arg(long, env = "FACE_WARP_FACE_MODEL")]
    pub face_model: PathBuf,

    /// Docker image of the artifact-detection service
    #[arg(long, default_value = "leonrinkel/cvprw2019-face-artifacts")]
    pub predictor_image: String,

    /// Directory with the prediction helper script, mounted into the container
    #[arg(long, default_value = "helper")]
    pub helper_dir: PathBuf,

    /// Prediction timeout in seconds, 0 disables the timeout
    #[arg(long, default_value_t = 3600)]
    pub prediction_timeout_secs: u64,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
