//! Consistency auditors for mappings invalidated by external change.
//!
//! Both detectors only report. Mutation happens through the explicit
//! `remove`/`apply` calls once the caller has confirmed.

use std::path::{Path, PathBuf};

use colmap_catalog::{SchemaCatalog, SettingsProvider};

use crate::document::MappingDocument;
use crate::sources::SourceColumns;

// =============================================================================
// INVALID MAPPINGS
// =============================================================================

/// Why a mapping is no longer valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The target type is not in the schema registry.
    UnknownType,
    /// The property is hidden by settings or no longer exists.
    PropertyNotVisible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidMapping {
    pub data_type: String,
    pub property_name: String,
    pub column_header: String,
    pub reason: InvalidReason,
}

/// Finds mappings whose property fell out of the visible set.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvalidMappingDetector;

impl InvalidMappingDetector {
    pub fn detect<S: SettingsProvider>(
        catalog: &SchemaCatalog<S>,
        document: &MappingDocument,
    ) -> Vec<InvalidMapping> {
        let mut findings = Vec::new();
        for (data_type, entries) in document.mappings() {
            let known = catalog.is_valid_data_type(data_type);
            let visible = catalog.get_properties_for_type(data_type);
            for entry in entries {
                let reason = if !known {
                    InvalidReason::UnknownType
                } else if visible
                    .iter()
                    .any(|p| p.property_name.eq_ignore_ascii_case(&entry.property_name))
                {
                    continue;
                } else {
                    InvalidReason::PropertyNotVisible
                };
                findings.push(InvalidMapping {
                    data_type: data_type.clone(),
                    property_name: entry.property_name.clone(),
                    column_header: entry.column_header.clone(),
                    reason,
                });
            }
        }
        if !findings.is_empty() {
            tracing::info!(count = findings.len(), "Found invalid mappings");
        }
        findings
    }

    /// Removes confirmed findings. Returns how many mappings were removed.
    pub fn remove(document: &mut MappingDocument, findings: &[InvalidMapping]) -> usize {
        findings
            .iter()
            .filter(|f| {
                document
                    .remove_mapping(&f.data_type, &f.property_name)
                    .is_some()
            })
            .count()
    }
}

// =============================================================================
// ORPHANED MAPPINGS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedMapping {
    pub data_type: String,
    pub property_name: String,
    pub column_header: String,
}

/// What removing one referenced file would break.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanReport {
    pub file_path: PathBuf,
    /// Mappings whose column exists only in the removed file.
    pub orphaned: Vec<OrphanedMapping>,
    /// `(data_type, display_name)` selections pointing into the removed file.
    pub stale_table_references: Vec<(String, String)>,
}

impl OrphanReport {
    pub fn is_empty(&self) -> bool {
        self.orphaned.is_empty() && self.stale_table_references.is_empty()
    }

    /// Removes the reported mappings and table selections.
    ///
    /// Returns the number of mappings removed.
    pub fn apply(&self, document: &mut MappingDocument) -> usize {
        let removed = self
            .orphaned
            .iter()
            .filter(|o| {
                document
                    .remove_mapping(&o.data_type, &o.property_name)
                    .is_some()
            })
            .count();
        for (data_type, _) in &self.stale_table_references {
            document.clear_table_reference(data_type);
        }
        removed
    }
}

/// Finds mappings that depend on a referenced file about to be removed.
///
/// Works purely from the recorded [`SourceColumns`] snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphanedMappingDetector;

impl OrphanedMappingDetector {
    pub fn detect(
        document: &MappingDocument,
        sources: &SourceColumns,
        file_path: &Path,
    ) -> OrphanReport {
        let in_file = sources.column_names_in_file(file_path);
        let elsewhere = sources.column_names_outside_file(file_path);

        let orphaned = document
            .mappings()
            .iter()
            .flat_map(|(data_type, entries)| entries.iter().map(move |e| (data_type, e)))
            .filter(|(_, e)| {
                let column = e.column_header.to_lowercase();
                in_file.contains(&column) && !elsewhere.contains(&column)
            })
            .map(|(data_type, e)| OrphanedMapping {
                data_type: data_type.clone(),
                property_name: e.property_name.clone(),
                column_header: e.column_header.clone(),
            })
            .collect();

        // Display keys carry only the file name, so a same-named file in
        // another directory keeps the selection alive.
        let file_tables = sources.tables_for_file(file_path);
        let stale_table_references = document
            .table_references()
            .iter()
            .filter(|(_, display)| {
                file_tables.iter().any(|t| t.matches_display_name(display))
                    && !sources
                        .tables()
                        .any(|t| t.file_path != file_path && t.matches_display_name(display))
            })
            .map(|(data_type, display)| (data_type.clone(), display.clone()))
            .collect();

        OrphanReport {
            file_path: file_path.to_path_buf(),
            orphaned,
            stale_table_references,
        }
    }

    /// Applies a confirmed report and unregisters the file.
    pub fn remove_file(
        document: &mut MappingDocument,
        sources: &mut SourceColumns,
        report: &OrphanReport,
    ) -> usize {
        let removed = report.apply(document);
        document.remove_referenced_file(&report.file_path);
        sources.remove_file(&report.file_path);
        tracing::info!(
            path = %report.file_path.display(),
            removed_mappings = removed,
            "Removed referenced file"
        );
        removed
    }
}
