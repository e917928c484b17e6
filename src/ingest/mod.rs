//! Loading run submissions from files, plus the built-in demo batch

mod demo;

pub use demo::demo_submissions;

use crate::model::RunSubmission;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Accepted batch file shapes: a bare list, or a mapping with a `runs` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchFile {
    List(Vec<RunSubmission>),
    Wrapped { runs: Vec<RunSubmission> },
}

impl From<BatchFile> for Vec<RunSubmission> {
    fn from(file: BatchFile) -> Self {
        match file {
            BatchFile::List(runs) | BatchFile::Wrapped { runs } => runs,
        }
    }
}

/// Reads a batch of submissions. `.yaml`/`.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn load_submissions(path: &Path) -> Result<Vec<RunSubmission>, IngestError> {
    let content = read(path)?;
    let submissions: Vec<RunSubmission> = if is_yaml(path) {
        serde_yaml::from_str::<BatchFile>(&content)
            .map_err(|source| IngestError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
            .into()
    } else {
        serde_json::from_str::<BatchFile>(&content)
            .map_err(|source| IngestError::Json {
                path: path.to_path_buf(),
                source,
            })?
            .into()
    };

    debug!(path = %path.display(), count = submissions.len(), "Loaded submissions");
    Ok(submissions)
}

/// Builds a submission from a raw log file. The test name defaults to the
/// file stem.
pub fn submission_from_log(
    path: &Path,
    test_name: Option<&str>,
) -> Result<RunSubmission, IngestError> {
    let logs = read(path)?;
    let test_name = test_name.map(str::to_string).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string())
    });
    Ok(RunSubmission::new(test_name, logs))
}

fn read(path: &Path) -> Result<String, IngestError> {
    fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
