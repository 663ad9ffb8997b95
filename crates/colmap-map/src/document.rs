//! The mapping document: authoritative mapping state for one map file.
//!
//! Holds the referenced source files, the field-to-column mappings per target
//! type and the selected source table per type. Within a type each property
//! maps to at most one column; updates are last-write-wins. Conflict handling
//! (a column already bound to another property) is left to the caller, who can
//! look it up with [`MappingDocument::property_for_column`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use colmap_model::{FileStatus, MappingEntry, ReferencedFile};

use crate::error::{MappingError, Result, require_name};
use crate::tracker::DirtyTracker;

/// Editor metadata of a map file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapMetadata {
    pub map_name: String,
    pub description: String,
    pub software_version: String,
    pub date_modified: Option<DateTime<Utc>>,
}

/// Mapping state owned by a single editor.
#[derive(Debug, Clone, Default)]
pub struct MappingDocument {
    pub metadata: MapMetadata,
    referenced_files: Vec<ReferencedFile>,
    mappings: BTreeMap<String, Vec<MappingEntry>>,
    table_references: BTreeMap<String, String>,
    tracker: DirtyTracker,
}

fn find_key<'a, V>(map: &'a BTreeMap<String, V>, data_type: &str) -> Option<&'a String> {
    map.keys().find(|k| k.eq_ignore_ascii_case(data_type))
}

impl MappingDocument {
    pub fn new(map_name: impl Into<String>) -> Self {
        Self {
            metadata: MapMetadata {
                map_name: map_name.into(),
                ..MapMetadata::default()
            },
            ..Self::default()
        }
    }

    // =========================================================================
    // Mappings
    // =========================================================================

    /// Binds `property` to `column` as a user-confirmed mapping.
    ///
    /// Replaces any existing mapping of the property and returns it.
    pub fn update_mapping(
        &mut self,
        data_type: &str,
        property: &str,
        column: &str,
    ) -> Result<Option<MappingEntry>> {
        let data_type = require_name("data type", data_type)?;
        let property = require_name("property name", property)?;
        let column = require_name("column header", column)?;
        Ok(self.upsert(data_type, MappingEntry::manual(property, column)))
    }

    /// Binds `property` to `column` with an auto-map confidence in `0..=1`.
    pub fn update_auto_mapping(
        &mut self,
        data_type: &str,
        property: &str,
        column: &str,
        confidence: f32,
    ) -> Result<Option<MappingEntry>> {
        let data_type = require_name("data type", data_type)?;
        let property = require_name("property name", property)?;
        let column = require_name("column header", column)?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(MappingError::ArgumentInvalid {
                argument: "confidence",
                reason: format!("{confidence} is outside 0..=1"),
            });
        }
        Ok(self.upsert(
            data_type,
            MappingEntry::automatic(property, column, confidence),
        ))
    }

    fn upsert(&mut self, data_type: &str, entry: MappingEntry) -> Option<MappingEntry> {
        let key = find_key(&self.mappings, data_type)
            .cloned()
            .unwrap_or_else(|| data_type.to_string());
        let entries = self.mappings.entry(key).or_default();
        let previous = match entries
            .iter()
            .position(|e| e.property_name.eq_ignore_ascii_case(&entry.property_name))
        {
            Some(index) => Some(std::mem::replace(&mut entries[index], entry)),
            None => {
                entries.push(entry);
                None
            }
        };
        self.mark_dirty();
        previous
    }

    /// Removes the mapping of `property`, returning it if one existed.
    pub fn remove_mapping(&mut self, data_type: &str, property: &str) -> Option<MappingEntry> {
        let key = find_key(&self.mappings, data_type)?.clone();
        let entries = self.mappings.get_mut(&key)?;
        let index = entries
            .iter()
            .position(|e| e.property_name.eq_ignore_ascii_case(property.trim()))?;
        let removed = entries.remove(index);
        if entries.is_empty() {
            self.mappings.remove(&key);
        }
        self.mark_dirty();
        Some(removed)
    }

    /// Removes every mapping of a type. Returns how many were removed.
    pub fn clear_mappings(&mut self, data_type: &str) -> usize {
        let Some(key) = find_key(&self.mappings, data_type).cloned() else {
            return 0;
        };
        let removed = self.mappings.remove(&key).map_or(0, |entries| entries.len());
        if removed > 0 {
            self.mark_dirty();
        }
        removed
    }

    /// Mappings of one type, in insertion order.
    pub fn mappings_for(&self, data_type: &str) -> &[MappingEntry] {
        find_key(&self.mappings, data_type)
            .and_then(|key| self.mappings.get(key))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn mapping_for(&self, data_type: &str, property: &str) -> Option<&MappingEntry> {
        self.mappings_for(data_type)
            .iter()
            .find(|e| e.property_name.eq_ignore_ascii_case(property.trim()))
    }

    /// The property a column is bound to within a type, if any.
    pub fn property_for_column(&self, data_type: &str, column: &str) -> Option<&str> {
        self.mappings_for(data_type)
            .iter()
            .find(|e| e.column_header.eq_ignore_ascii_case(column.trim()))
            .map(|e| e.property_name.as_str())
    }

    pub fn mappings(&self) -> &BTreeMap<String, Vec<MappingEntry>> {
        &self.mappings
    }

    /// Types that carry at least one mapping.
    pub fn mapped_types(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    pub fn mapping_count(&self) -> usize {
        self.mappings.values().map(Vec::len).sum()
    }

    // =========================================================================
    // Referenced files
    // =========================================================================

    pub fn referenced_files(&self) -> &[ReferencedFile] {
        &self.referenced_files
    }

    /// Registers a source file. Returns `false` if it was already registered.
    pub fn add_referenced_file(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.is_referenced(&path) {
            return false;
        }
        self.referenced_files.push(ReferencedFile::new(path));
        self.mark_dirty();
        true
    }

    /// Unregisters a source file. Mappings are left untouched; run the
    /// orphan detector first to find the ones that depended on it.
    pub fn remove_referenced_file(&mut self, path: &Path) -> Option<ReferencedFile> {
        let index = self
            .referenced_files
            .iter()
            .position(|f| f.file_path == path)?;
        self.mark_dirty();
        Some(self.referenced_files.remove(index))
    }

    pub fn is_referenced(&self, path: &Path) -> bool {
        self.referenced_files.iter().any(|f| f.file_path == path)
    }

    /// Updates the availability status of a referenced file.
    ///
    /// Status is runtime state and does not mark the document dirty.
    pub fn set_file_status(&mut self, path: &Path, status: FileStatus) -> bool {
        match self
            .referenced_files
            .iter_mut()
            .find(|f| f.file_path == path)
        {
            Some(file) if file.status != status => {
                file.status = status;
                true
            }
            _ => false,
        }
    }

    // =========================================================================
    // Table references
    // =========================================================================

    /// Selected source table (display key) for a type.
    pub fn table_reference(&self, data_type: &str) -> Option<&str> {
        find_key(&self.table_references, data_type)
            .and_then(|key| self.table_references.get(key))
            .map(String::as_str)
    }

    pub fn set_table_reference(&mut self, data_type: &str, display_name: &str) -> Result<()> {
        let data_type = require_name("data type", data_type)?;
        let display_name = require_name("table reference", display_name)?;
        let key = find_key(&self.table_references, data_type)
            .cloned()
            .unwrap_or_else(|| data_type.to_string());
        if self.table_references.get(&key).map(String::as_str) != Some(display_name) {
            self.table_references.insert(key, display_name.to_string());
            self.mark_dirty();
        }
        Ok(())
    }

    pub fn clear_table_reference(&mut self, data_type: &str) -> Option<String> {
        let key = find_key(&self.table_references, data_type)?.clone();
        let removed = self.table_references.remove(&key);
        self.mark_dirty();
        removed
    }

    pub fn table_references(&self) -> &BTreeMap<String, String> {
        &self.table_references
    }

    // =========================================================================
    // Dirty state
    // =========================================================================

    pub fn mark_dirty(&mut self) {
        self.tracker.mark_dirty();
    }

    pub fn mark_saved(&mut self) {
        self.tracker.mark_saved();
    }

    pub fn is_dirty(&self) -> bool {
        self.tracker.is_dirty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_is_last_write_wins() {
        let mut doc = MappingDocument::new("network");
        assert!(doc.update_mapping("Bus", "Name", "BusName").unwrap().is_none());
        let previous = doc.update_mapping("Bus", "name", "Label").unwrap();
        assert_eq!(previous.unwrap().column_header, "BusName");

        let entries = doc.mappings_for("Bus");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].column_header, "Label");
        assert!(doc.is_dirty());
    }

    #[test]
    fn test_manual_update_clears_confidence() {
        let mut doc = MappingDocument::new("network");
        doc.update_auto_mapping("Bus", "Id", "BusId", 0.8).unwrap();
        assert_eq!(doc.mapping_for("Bus", "Id").unwrap().confidence, Some(0.8));

        doc.update_mapping("Bus", "Id", "BusId").unwrap();
        assert!(doc.mapping_for("Bus", "Id").unwrap().is_manual());
    }

    #[test]
    fn test_rejects_blank_arguments() {
        let mut doc = MappingDocument::new("network");
        assert!(matches!(
            doc.update_mapping("", "Id", "A"),
            Err(MappingError::ArgumentInvalid { argument: "data type", .. })
        ));
        assert!(doc.update_mapping("Bus", " ", "A").is_err());
        assert!(doc.update_auto_mapping("Bus", "Id", "A", 1.5).is_err());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut doc = MappingDocument::new("network");
        doc.update_mapping("Bus", "Id", "A").unwrap();
        doc.update_mapping("Bus", "Name", "B").unwrap();
        doc.mark_saved();

        assert!(doc.remove_mapping("Bus", "Missing").is_none());
        assert!(!doc.is_dirty());
        assert_eq!(doc.remove_mapping("bus", "ID").unwrap().column_header, "A");
        assert!(doc.is_dirty());

        assert_eq!(doc.clear_mappings("Bus"), 1);
        assert_eq!(doc.clear_mappings("Bus"), 0);
        assert!(doc.mappings().is_empty());
    }

    #[test]
    fn test_property_for_column() {
        let mut doc = MappingDocument::new("network");
        doc.update_mapping("Line", "FromBus", "From").unwrap();
        assert_eq!(doc.property_for_column("Line", "from"), Some("FromBus"));
        assert_eq!(doc.property_for_column("Bus", "From"), None);
    }

    #[test]
    fn test_referenced_files_are_unique() {
        let mut doc = MappingDocument::new("network");
        assert!(doc.add_referenced_file("/data/buses.csv"));
        assert!(!doc.add_referenced_file("/data/buses.csv"));
        assert_eq!(doc.referenced_files().len(), 1);

        assert!(doc.set_file_status(Path::new("/data/buses.csv"), FileStatus::Missing));
        assert!(!doc.set_file_status(Path::new("/data/buses.csv"), FileStatus::Missing));

        assert!(doc.remove_referenced_file(Path::new("/data/buses.csv")).is_some());
        assert!(doc.referenced_files().is_empty());
    }

    #[test]
    fn test_table_reference_round_trip() {
        let mut doc = MappingDocument::new("network");
        doc.set_table_reference("Bus", "network.xlsx | Buses").unwrap();
        assert_eq!(doc.table_reference("bus"), Some("network.xlsx | Buses"));
        assert_eq!(
            doc.clear_table_reference("Bus").as_deref(),
            Some("network.xlsx | Buses")
        );
        assert_eq!(doc.table_reference("Bus"), None);
    }
}
