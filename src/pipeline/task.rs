// Work item builder: pure path arithmetic, no I/O.

use crate::dataset::DatasetItem;
use crate::pipeline::types::WorkItem;
use anyhow::{Context, Result};
use std::path::Path;

/// Suffix appended to every derived per-task output directory.
pub const OUTPUT_DIR_SUFFIX: &str = "_warp";

/// Per-run parameters shared by every work item.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub frame_limit: usize,
    pub relative_padding: f32,
    pub log_file_name: String,
    pub predictions_file_name: String,
}

/// Derives the work item for one dataset item. The output directory is the
/// item's path with the extension stripped, re-rooted from the dataset root
/// under the output root, with the fixed suffix appended.
///
/// Fails only when the item path is not under the dataset root, which is a
/// configuration violation and fatal for the run.
pub fn build_work_item(
    dataset_root: &Path,
    output_root: &Path,
    item: &DatasetItem,
    config: &TaskConfig,
) -> Result<WorkItem> {
    let stripped = item.file_path.with_extension("");
    let relative = stripped.strip_prefix(dataset_root).with_context(|| {
        format!(
            "dataset item {:?} is not under the dataset root {:?}",
            item.file_path, dataset_root
        )
    })?;

    let mut output_dir = output_root.join(relative).into_os_string();
    output_dir.push(OUTPUT_DIR_SUFFIX);

    Ok(WorkItem {
        input_file_path: item.file_path.clone(),
        output_dir: output_dir.into(),
        frame_limit: config.frame_limit,
        relative_padding: config.relative_padding,
        log_file_name: config.log_file_name.clone(),
        predictions_file_name: config.predictions_file_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetLabel;
    use std::path::PathBuf;

    fn item(path: &str) -> DatasetItem {
        DatasetItem {
            subject_id: "subject-01".to_string(),
            file_path: PathBuf::from(path),
            label: DatasetLabel {
                age: "30-39".to_string(),
                gender: "female".to_string(),
                skin_type: "iv".to_string(),
            },
        }
    }

    fn config() -> TaskConfig {
        TaskConfig {
            frame_limit: 100,
            relative_padding: 0.1,
            log_file_name: "warp.log".to_string(),
            predictions_file_name: "warp.json".to_string(),
        }
    }

    #[test]
    fn derives_output_dir_from_relative_path() {
        let work = build_work_item(
            Path::new("/data/videos"),
            Path::new("/data/out"),
            &item("/data/videos/subject-01/clip.mp4"),
            &config(),
        )
        .unwrap();

        assert_eq!(
            work.output_dir,
            PathBuf::from("/data/out/subject-01/clip_warp")
        );
        assert_eq!(
            work.input_file_path,
            PathBuf::from("/data/videos/subject-01/clip.mp4")
        );
        assert_eq!(work.frame_limit, 100);
        assert_eq!(work.log_path(), work.output_dir.join("warp.log"));
        assert_eq!(work.predictions_path(), work.output_dir.join("warp.json"));
    }

    #[test]
    fn builder_is_deterministic() {
        let a = build_work_item(
            Path::new("/data/videos"),
            Path::new("/data/out"),
            &item("/data/videos/a/b/clip.avi"),
            &config(),
        )
        .unwrap();
        let b = build_work_item(
            Path::new("/data/videos"),
            Path::new("/data/out"),
            &item("/data/videos/a/b/clip.avi"),
            &config(),
        )
        .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.output_dir, PathBuf::from("/data/out/a/b/clip_warp"));
    }

    #[test]
    fn fails_when_item_is_outside_dataset_root() {
        let result = build_work_item(
            Path::new("/data/videos"),
            Path::new("/data/out"),
            &item("/elsewhere/clip.mp4"),
            &config(),
        );

        assert!(result.is_err());
    }
}
