//! Map file loading.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

use colmap_map::MappingDocument;

use crate::error::{PersistenceError, Result};
use crate::format::{MapFile, import_map_array};

/// Loads a map file into a clean document.
pub fn load_map(path: &Path) -> Result<MappingDocument> {
    let file = read_map_file(path)?;
    let document = file.into_document();
    tracing::info!(
        mappings = document.mapping_count(),
        files = document.referenced_files().len(),
        "Loaded map from {}",
        path.display()
    );
    Ok(document)
}

/// Reads and parses a map file without building a document.
pub fn read_map_file(path: &Path) -> Result<MapFile> {
    let text = fs::read_to_string(path).map_err(|e| PersistenceError::io("read", path, e))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| PersistenceError::InvalidFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    MapFile::from_json(&value, path, modified_time(path))
}

/// Loads a map file on the blocking thread pool.
pub async fn load_map_async(path: PathBuf) -> Result<MappingDocument> {
    tokio::task::spawn_blocking(move || load_map(&path))
        .await
        .map_err(|source| PersistenceError::Task { source })?
}

/// Cheap shape check: the file parses as JSON and has an `ImportMap` array.
///
/// Never fails; unreadable files are reported as not valid.
pub fn is_valid_map_file(path: &Path) -> bool {
    let Ok(text) = fs::read_to_string(path) else {
        return false;
    };
    serde_json::from_str::<Value>(&text)
        .ok()
        .is_some_and(|value| import_map_array(&value).is_some())
}

fn modified_time(path: &Path) -> Option<DateTime<Utc>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}
