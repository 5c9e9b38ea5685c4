// Annotations loader: turns the dataset annotations JSON into DatasetItems.
//
// Annotation shape: a map of subject id to {"files": [...], "label":
// {"age", "gender", "skin-type"}}. File entries are relative to the
// dataset root; entries pointing at missing files are dropped with a
// warning instead of failing the run.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetLabel {
    pub age: String,
    pub gender: String,
    #[serde(rename = "skin-type")]
    pub skin_type: String,
}

/// One annotated video file of one subject.
#[derive(Debug, Clone)]
pub struct DatasetItem {
    pub subject_id: String,
    pub file_path: PathBuf,
    pub label: DatasetLabel,
}

#[derive(Debug, Deserialize)]
struct SubjectAnnotation {
    files: Vec<String>,
    label: DatasetLabel,
}

pub fn load_dataset(dataset_root: &Path, annotations_path: &Path) -> Result<Vec<DatasetItem>> {
    let raw = fs::read_to_string(annotations_path)
        .with_context(|| format!("failed to read annotations file: {:?}", annotations_path))?;
    let annotations: BTreeMap<String, SubjectAnnotation> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse annotations file: {:?}", annotations_path))?;

    let mut items = Vec::new();
    for (subject_id, annotation) in annotations {
        for file in &annotation.files {
            let file_path = dataset_root.join(file);
            if !file_path.is_file() {
                tracing::warn!(
                    "ignoring dataset item because file does not exist: {:?}",
                    file_path
                );
                continue;
            }

            items.push(DatasetItem {
                subject_id: subject_id.clone(),
                file_path,
                label: annotation.label.clone(),
            });
        }
    }

    Ok(items)
}
