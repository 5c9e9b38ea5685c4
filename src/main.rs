mod cli;
mod dataset;
mod logsink;
mod pipeline;
mod predict;
mod video;

use anyhow::Result;
use cli::Args;
use pipeline::detection::CascadeFaceDetectorProvider;
use pipeline::orchestrator::{run_pipeline, PipelineConfig};
use pipeline::task::TaskConfig;
use predict::DockerPredictionService;
use std::sync::Arc;
use std::time::Duration;
use video::opencv_reader::OpencvSource;

fn main() -> Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse_args();

    let config = PipelineConfig {
        dataset_root: args.dataset_root,
        annotations_path: args.annotations,
        output_root: args.output_root,
        worker_count: args.workers,
        task: TaskConfig {
            frame_limit: args.frame_limit,
            relative_padding: args.relative_padding,
            log_file_name: args.log_file_name,
            predictions_file_name: args.predictions_file_name,
        },
    };

    let timeout = match args.prediction_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let predictor = Arc::new(DockerPredictionService::new(
        args.predictor_image,
        args.helper_dir,
        timeout,
    ));
    let detectors = Arc::new(CascadeFaceDetectorProvider::new(args.face_model));

    let summary = run_pipeline(&config, Arc::new(OpencvSource), detectors, predictor)?;
    tracing::info!("run complete, {} tasks processed", summary.tasks_enqueued);

    Ok(())
}
