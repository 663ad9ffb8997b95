//! Referenced-file availability checks.
//!
//! Checking is read-only and may run on a background task; the document
//! owner applies the results with [`apply_file_statuses`].

use std::path::PathBuf;

use colmap_model::FileStatus;

use crate::document::MappingDocument;
use crate::error::{MappingError, Result};

/// Checks whether each path exists as a file.
pub fn check_file_statuses(paths: &[PathBuf]) -> Vec<(PathBuf, FileStatus)> {
    paths
        .iter()
        .map(|path| {
            let status = if path.is_file() {
                FileStatus::Available
            } else {
                FileStatus::Missing
            };
            (path.clone(), status)
        })
        .collect()
}

/// Runs [`check_file_statuses`] on a blocking thread.
pub async fn check_file_statuses_async(
    paths: Vec<PathBuf>,
) -> Result<Vec<(PathBuf, FileStatus)>> {
    tokio::task::spawn_blocking(move || check_file_statuses(&paths))
        .await
        .map_err(|e| MappingError::Task {
            message: e.to_string(),
        })
}

/// Writes checked statuses back to the document. Returns how many changed.
pub fn apply_file_statuses(
    document: &mut MappingDocument,
    statuses: &[(PathBuf, FileStatus)],
) -> usize {
    let changed = statuses
        .iter()
        .filter(|(path, status)| document.set_file_status(path, *status))
        .count();
    let missing = statuses
        .iter()
        .filter(|(_, s)| *s == FileStatus::Missing)
        .count();
    if missing > 0 {
        tracing::warn!(missing, "Referenced source files are missing");
    }
    changed
}

/// Checks and applies statuses for every referenced file.
pub fn refresh_file_statuses(document: &mut MappingDocument) -> usize {
    let paths: Vec<PathBuf> = document
        .referenced_files()
        .iter()
        .map(|f| f.file_path.clone())
        .collect();
    let statuses = check_file_statuses(&paths);
    apply_file_statuses(document, &statuses)
}
