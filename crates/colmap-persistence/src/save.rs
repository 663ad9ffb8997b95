//! Map file saving.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use colmap_catalog::{SchemaCatalog, SettingsProvider};
use colmap_map::MappingDocument;

use crate::error::{PersistenceError, Result};
use crate::format::{MapFile, SOFTWARE_VERSION, is_required_in_catalog};

/// Saves a document as a JSON map file.
///
/// Stamps `DateModified` and `SoftwareVersion`, writes atomically, then
/// marks the document saved. On failure the document is left untouched.
pub fn save_map<F>(document: &mut MappingDocument, path: &Path, is_required: F) -> Result<()>
where
    F: Fn(&str, &str) -> bool,
{
    let file = MapFile::from_document(document, is_required);
    save_map_file(document, path, file)
}

/// Saves `file`, a snapshot of `document`, and marks the document saved.
///
/// Lets callers add editor metadata such as recorded source columns before
/// writing.
pub fn save_map_file(document: &mut MappingDocument, path: &Path, mut file: MapFile) -> Result<()> {
    if file.map_name.trim().is_empty() {
        file.map_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
    }
    file.date_modified = Some(Utc::now());

    write_map_file(&file, path)?;

    document.metadata.map_name.clone_from(&file.map_name);
    document.metadata.date_modified = file.date_modified;
    document.metadata.software_version = SOFTWARE_VERSION.to_string();
    document.mark_saved();
    Ok(())
}

/// Saves using the catalog's required-field policy for the `Required` column.
pub fn save_map_with_catalog<S: SettingsProvider>(
    document: &mut MappingDocument,
    path: &Path,
    catalog: &SchemaCatalog<S>,
) -> Result<()> {
    save_map(document, path, |data_type, property| {
        is_required_in_catalog(catalog, data_type, property)
    })
}

/// Writes a map file with temp file + rename.
pub fn write_map_file(file: &MapFile, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(file).map_err(|e| PersistenceError::Serialization {
        source: Box::new(e),
    })?;

    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| PersistenceError::io("create directory", parent, e))?;
    }

    if let Err(error) = write_and_rename(&json, &temp_path, path) {
        if let Err(cleanup) = fs::remove_file(&temp_path)
            && cleanup.kind() != ErrorKind::NotFound
        {
            tracing::warn!(path = %temp_path.display(), error = %cleanup, "Could not remove temp file");
        }
        return Err(error);
    }

    tracing::info!(
        entries = file.import_map.len(),
        "Saved map to {}",
        path.display()
    );
    Ok(())
}

fn write_and_rename(json: &[u8], temp_path: &Path, path: &Path) -> Result<()> {
    let mut out =
        File::create(temp_path).map_err(|e| PersistenceError::io("create", temp_path, e))?;
    out.write_all(json)
        .map_err(|e| PersistenceError::io("write", temp_path, e))?;
    out.sync_all()
        .map_err(|e| PersistenceError::io("sync", temp_path, e))?;
    drop(out);

    fs::rename(temp_path, path).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.to_path_buf(),
        target_path: path.to_path_buf(),
        source: e,
    })
}

/// Writes a map file on the blocking thread pool.
pub async fn save_map_async(file: MapFile, path: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || write_map_file(&file, &path))
        .await
        .map_err(|source| PersistenceError::Task { source })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_marks_clean_and_stamps_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("maps").join("grid.json");

        let mut doc = MappingDocument::new("");
        doc.update_mapping("Bus", "Id", "Bus ID").unwrap();
        assert!(doc.is_dirty());

        save_map(&mut doc, &path, |_, _| false).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert!(!doc.is_dirty());
        assert_eq!(doc.metadata.map_name, "grid");
        assert!(doc.metadata.date_modified.is_some());
        assert_eq!(doc.metadata.software_version, SOFTWARE_VERSION);
    }

    #[test]
    fn test_failed_save_keeps_document_dirty() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("grid.json");

        let mut doc = MappingDocument::new("grid");
        doc.update_mapping("Bus", "Id", "Bus ID").unwrap();

        let err = save_map(&mut doc, &path, |_, _| false).unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert!(doc.is_dirty());
        assert!(doc.metadata.date_modified.is_none());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let mut doc = MappingDocument::new("grid");
        doc.update_mapping("Bus", "Id", "Bus ID").unwrap();

        let err = save_map(&mut doc, &path, |_, _| false).unwrap_err();
        assert!(matches!(err, PersistenceError::AtomicWriteFailed { .. }));
        assert!(!path.with_extension("json.tmp").exists());
        assert!(doc.is_dirty());
    }
}
