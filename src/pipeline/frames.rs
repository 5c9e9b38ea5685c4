// Per-task face frame pipeline.
//
// One task walks the states: ensure output dir -> open capture ->
// per-frame {read, convert, check existing, detect, crop+write} ->
// summarize -> maybe predict. Every per-frame problem degrades to a skip;
// only the directory and capture building blocks can end a task early, and
// nothing raises past the worker.

use crate::logsink::LogSender;
use crate::pipeline::crop;
use crate::pipeline::detection::FaceDetector;
use crate::pipeline::types::{FrameOutcome, PredictionOutcome, TaskRun, TaskStats, WorkItem};
use crate::predict::{self, PredictionRequest, PredictionService};
use crate::video::{VideoReader, VideoSource};
use anyhow::Result;
use opencv::{core::Mat, imgproc};
use std::fs;

/// Converts a captured BGR frame into the detector's expected RGB order.
fn to_detector_order(frame: &Mat) -> Result<Mat> {
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(frame, &mut rgb, imgproc::COLOR_BGR2RGB)?;
    Ok(rgb)
}

fn process_frame(
    frame: &Mat,
    index: usize,
    task: &WorkItem,
    detector: &mut dyn FaceDetector,
    log: &LogSender,
) -> Result<FrameOutcome> {
    let rgb = to_detector_order(frame)?;

    let output_path = task.output_dir.join(format!("{index}.png"));
    if output_path.is_file() {
        log.debug(format!(
            "skipping frame {} of {:?} because output file already exists",
            index, task.input_file_path
        ));
        return Ok(FrameOutcome::SkippedExisting);
    }

    let faces = detector.detect(&rgb)?;
    if faces.is_empty() {
        log.warn(format!(
            "skipping frame {} of {:?} because there were no faces",
            index, task.input_file_path
        ));
        return Ok(FrameOutcome::SkippedNoFace);
    }
    if faces.len() > 1 {
        log.warn(format!(
            "skipping frame {} of {:?} because there were multiple faces",
            index, task.input_file_path
        ));
        return Ok(FrameOutcome::SkippedMultipleFaces);
    }

    crop::write_face_crop(&rgb, faces[0], task.relative_padding, &output_path)?;
    Ok(FrameOutcome::Written)
}

/// Frame loop of one task, capped at `frame_limit` frames or end of stream.
/// The frame index increments once per frame read, regardless of outcome,
/// so indices are 1-based and strictly increasing.
fn process_frames(
    reader: &mut dyn VideoReader,
    detector: &mut dyn FaceDetector,
    task: &WorkItem,
    log: &LogSender,
) -> TaskStats {
    let mut stats = TaskStats::default();

    while stats.read < task.frame_limit {
        let frame = match reader.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                log.warn(format!(
                    "stopping early, failed to read frame of {:?}: {e:#}",
                    task.input_file_path
                ));
                break;
            }
        };
        stats.read += 1;
        let index = stats.read;

        match process_frame(&frame, index, task, detector, log) {
            Ok(FrameOutcome::Written) => stats.written += 1,
            Ok(outcome) if outcome.is_warn() => stats.warned += 1,
            Ok(_) => {}
            Err(e) => {
                // A frame that failed mid-processing leaves a hole in the
                // face set, so it counts toward the prediction gate.
                log.error(format!(
                    "skipping frame {} of {:?}: {e:#}",
                    index, task.input_file_path
                ));
                stats.warned += 1;
            }
        }
    }

    stats
}

fn maybe_predict(
    task: &WorkItem,
    stats: &TaskStats,
    predictor: &dyn PredictionService,
    log: &LogSender,
) -> PredictionOutcome {
    if stats.warned > 0 {
        log.warn("not continuing with prediction because there were warnings");
        return PredictionOutcome::GatedByWarnings;
    }

    let log_path = task.log_path();
    let predictions_path = task.predictions_path();
    if log_path.is_file() && predictions_path.is_file() {
        log.info("skipping prediction because output files already exist");
        return PredictionOutcome::AlreadyDone;
    }

    let request = PredictionRequest {
        data_dir: task.output_dir.clone(),
        predictions_file_name: task.predictions_file_name.clone(),
        log_path,
    };
    log.debug(format!(
        "invoking prediction service on {:?}",
        request.data_dir
    ));
    match predictor.predict(&request) {
        Ok(()) => {
            match predict::load_report(&predictions_path) {
                Ok(report) => log.debug(format!(
                    "{} produced {} predictions for {:?}",
                    report.model_name,
                    report.predictions.len(),
                    task.input_file_path
                )),
                Err(e) => log.warn(format!(
                    "prediction finished but report is unreadable: {e:#}"
                )),
            }
            PredictionOutcome::Invoked
        }
        Err(e) => {
            log.error(format!(
                "prediction service failed for {:?}: {e:#}",
                task.input_file_path
            ));
            PredictionOutcome::Failed
        }
    }
}

/// Runs one task to completion. Never fails: task-level problems are logged
/// and end the task early, frame-level problems degrade to skips.
pub fn run_task(
    task: &WorkItem,
    video: &dyn VideoSource,
    detector: &mut dyn FaceDetector,
    predictor: &dyn PredictionService,
    log: &LogSender,
) -> TaskRun {
    if !task.output_dir.is_dir() {
        log.info(format!("creating output directory: {:?}", task.output_dir));
        if let Err(e) = fs::create_dir_all(&task.output_dir) {
            log.warn(format!(
                "unable to create output directory {:?}: {e}",
                task.output_dir
            ));
            return TaskRun::aborted();
        }
    }

    log.info(format!(
        "opening video capture for file: {:?}",
        task.input_file_path
    ));
    let mut reader = match video.open(&task.input_file_path) {
        Ok(reader) => reader,
        Err(e) => {
            log.warn(format!(
                "unable to open video capture for file {:?}: {e:#}",
                task.input_file_path
            ));
            return TaskRun::aborted();
        }
    };

    let stats = process_frames(reader.as_mut(), detector, task, log);
    drop(reader);

    log.info(format!(
        "read {} frames, wrote {} frames of {:?}",
        stats.read, stats.written, task.input_file_path
    ));

    let prediction = maybe_predict(task, &stats, predictor, log);
    TaskRun {
        stats,
        prediction: Some(prediction),
    }
}
