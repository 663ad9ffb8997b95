//! JSON map file shape.
//!
//! ```json
//! {
//!   "MapName": "network",
//!   "Description": "",
//!   "DateModified": "2024-05-01T10:00:00+00:00",
//!   "SoftwareVersion": "0.1.0",
//!   "MapVersion": 1,
//!   "ReferencedFiles": [{ "FilePath": "/data/network.xlsx" }],
//!   "ImportMap": [
//!     { "TargetType": "Bus", "PropertyName": "Id", "ColumnHeader": "Bus ID",
//!       "Required": true, "Severity": "Error" }
//!   ],
//!   "TableReferences": { "Bus": "network.xlsx | Buses" },
//!   "AutoConfidence": { "Bus": { "Zone": 0.82 } },
//!   "SourceColumns": [
//!     { "FilePath": "/data/network.xlsx", "TableName": "Buses",
//!       "Columns": ["Bus ID", "Name"] }
//!   ]
//! }
//! ```
//!
//! `ImportMap` is the payload shared with import consumers. Everything else
//! is editor metadata and may be absent. Reading goes through
//! [`MapFile::from_json`], which tolerates legacy shapes: bare-string
//! `ReferencedFiles`, incomplete `ImportMap` entries (skipped) and
//! unparsable dates.
//!
//! `SourceColumns` keeps the column names of each referenced table so a
//! file deleted after saving can still be audited for orphaned mappings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use colmap_catalog::{SchemaCatalog, SettingsProvider};
use colmap_map::{MapMetadata, MappingDocument, SourceColumns};

use crate::error::{PersistenceError, Result};

/// Current map file format version.
pub const MAP_VERSION: u32 = 1;

/// Version string written to `SoftwareVersion`.
pub const SOFTWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

const IMPORT_MAP_KEY: &str = "ImportMap";

/// Validation severity of an unmapped field for import consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn for_required(required: bool) -> Self {
        if required { Self::Error } else { Self::Warning }
    }
}

/// One `ImportMap` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImportMapEntry {
    pub target_type: String,
    pub property_name: String,
    pub column_header: String,
    pub required: bool,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReferencedFileEntry {
    pub file_path: PathBuf,
}

/// Recorded column names of one referenced table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceTableEntry {
    pub file_path: PathBuf,
    pub table_name: String,
    pub columns: Vec<String>,
}

/// In-memory form of a map file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapFile {
    pub map_name: String,
    pub description: String,
    pub date_modified: Option<DateTime<Utc>>,
    pub software_version: String,
    pub map_version: u32,
    pub referenced_files: Vec<ReferencedFileEntry>,
    pub import_map: Vec<ImportMapEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub table_references: BTreeMap<String, String>,
    /// Confidence of unconfirmed auto-mapped entries, by type then property.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub auto_confidence: BTreeMap<String, BTreeMap<String, f32>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_columns: Vec<SourceTableEntry>,
}

impl MapFile {
    /// Snapshots a document. `is_required(type, property)` fills the
    /// `Required`/`Severity` columns.
    pub fn from_document<F>(document: &MappingDocument, is_required: F) -> Self
    where
        F: Fn(&str, &str) -> bool,
    {
        let import_map = document
            .mappings()
            .iter()
            .flat_map(|(data_type, entries)| {
                entries.iter().map(|entry| {
                    let required = is_required(data_type, &entry.property_name);
                    ImportMapEntry {
                        target_type: data_type.clone(),
                        property_name: entry.property_name.clone(),
                        column_header: entry.column_header.clone(),
                        required,
                        severity: Severity::for_required(required),
                    }
                })
            })
            .collect();

        let auto_confidence = document
            .mappings()
            .iter()
            .filter_map(|(data_type, entries)| {
                let scores: BTreeMap<String, f32> = entries
                    .iter()
                    .filter_map(|e| e.confidence.map(|c| (e.property_name.clone(), c)))
                    .collect();
                (!scores.is_empty()).then(|| (data_type.clone(), scores))
            })
            .collect();

        let metadata = &document.metadata;
        Self {
            map_name: metadata.map_name.clone(),
            description: metadata.description.clone(),
            date_modified: metadata.date_modified,
            software_version: SOFTWARE_VERSION.to_string(),
            map_version: MAP_VERSION,
            referenced_files: document
                .referenced_files()
                .iter()
                .map(|f| ReferencedFileEntry {
                    file_path: f.file_path.clone(),
                })
                .collect(),
            import_map,
            table_references: document.table_references().clone(),
            auto_confidence,
            source_columns: Vec::new(),
        }
    }

    /// Adds the recorded columns of the referenced source files.
    #[must_use]
    pub fn with_source_columns(mut self, sources: &SourceColumns) -> Self {
        self.source_columns = sources
            .snapshots()
            .map(|(reference, columns)| SourceTableEntry {
                file_path: reference.file_path.clone(),
                table_name: reference.table_name.clone(),
                columns: columns.iter().map(|c| c.column_name.clone()).collect(),
            })
            .collect();
        self
    }

    /// Rebuilds the recorded columns saved with the map.
    pub fn recorded_sources(&self) -> SourceColumns {
        let mut by_file: BTreeMap<&Path, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for entry in &self.source_columns {
            by_file
                .entry(entry.file_path.as_path())
                .or_default()
                .insert(entry.table_name.clone(), entry.columns.clone());
        }
        let mut sources = SourceColumns::new();
        for (path, tables) in &by_file {
            sources.record_names(path, tables);
        }
        sources
    }

    /// Snapshots a document using the catalog's required-field policy.
    pub fn from_document_with_catalog<S: SettingsProvider>(
        document: &MappingDocument,
        catalog: &SchemaCatalog<S>,
    ) -> Self {
        Self::from_document(document, |data_type, property| {
            is_required_in_catalog(catalog, data_type, property)
        })
    }

    /// Rebuilds a clean (not dirty) document.
    pub fn into_document(self) -> MappingDocument {
        let mut document = MappingDocument::new(self.map_name.clone());
        document.metadata = MapMetadata {
            map_name: self.map_name,
            description: self.description,
            software_version: self.software_version,
            date_modified: self.date_modified,
        };

        for file in self.referenced_files {
            document.add_referenced_file(file.file_path);
        }
        for entry in self.import_map {
            let confidence = self
                .auto_confidence
                .get(&entry.target_type)
                .and_then(|scores| scores.get(&entry.property_name))
                .copied();
            let applied = match confidence {
                Some(c) => document.update_auto_mapping(
                    &entry.target_type,
                    &entry.property_name,
                    &entry.column_header,
                    c,
                ),
                None => document.update_mapping(
                    &entry.target_type,
                    &entry.property_name,
                    &entry.column_header,
                ),
            };
            if let Err(e) = applied {
                tracing::warn!(
                    target_type = %entry.target_type,
                    error = %e,
                    "Skipping ImportMap entry"
                );
            }
        }
        for (data_type, display_name) in self.table_references {
            if let Err(e) = document.set_table_reference(&data_type, &display_name) {
                tracing::warn!(data_type = %data_type, error = %e, "Skipping table reference");
            }
        }
        document.mark_saved();
        document
    }

    /// Reads a map file from parsed JSON.
    ///
    /// Only a missing or non-array `ImportMap` is an error. `path` names the
    /// file in errors and supplies the default `MapName` (file stem);
    /// `fallback_date` is used when `DateModified` is absent or unparsable.
    pub fn from_json(
        value: &Value,
        path: &Path,
        fallback_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| invalid(path, "top level is not a JSON object"))?;
        let import_map = import_map_array(value)
            .ok_or_else(|| invalid(path, "missing ImportMap array"))?;

        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let map_name = text("MapName")
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_map_name(path));
        let date_modified = text("DateModified")
            .as_deref()
            .and_then(parse_date)
            .or(fallback_date);

        let referenced_files: Vec<ReferencedFileEntry> = object
            .get("ReferencedFiles")
            .and_then(Value::as_array)
            .map(|files| files.iter().filter_map(referenced_file).collect())
            .unwrap_or_default();

        let import_map: Vec<ImportMapEntry> = import_map
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let parsed = import_map_entry(entry);
                if parsed.is_none() {
                    tracing::warn!(path = %path.display(), index, "Skipping incomplete ImportMap entry");
                }
                parsed
            })
            .collect();

        let table_references: BTreeMap<String, String> = object
            .get("TableReferences")
            .and_then(Value::as_object)
            .map(|refs| {
                refs.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let auto_confidence: BTreeMap<String, BTreeMap<String, f32>> = object
            .get("AutoConfidence")
            .and_then(Value::as_object)
            .map(|types| {
                types
                    .iter()
                    .filter_map(|(data_type, scores)| {
                        let scores = scores.as_object()?;
                        let scores: BTreeMap<String, f32> = scores
                            .iter()
                            .filter_map(|(property, score)| {
                                let score = score.as_f64().filter(|s| (0.0..=1.0).contains(s))?;
                                Some((property.clone(), score as f32))
                            })
                            .collect();
                        Some((data_type.clone(), scores))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let source_columns: Vec<SourceTableEntry> = object
            .get("SourceColumns")
            .and_then(Value::as_array)
            .map(|tables| tables.iter().filter_map(source_table).collect())
            .unwrap_or_default();

        Ok(Self {
            map_name,
            description: text("Description").unwrap_or_default(),
            date_modified,
            software_version: text("SoftwareVersion").unwrap_or_default(),
            map_version: object
                .get("MapVersion")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(MAP_VERSION),
            referenced_files,
            import_map,
            table_references,
            auto_confidence,
            source_columns,
        })
    }
}

/// Whether the catalog's required-field policy requires `property`.
pub(crate) fn is_required_in_catalog<S: SettingsProvider>(
    catalog: &SchemaCatalog<S>,
    data_type: &str,
    property: &str,
) -> bool {
    catalog
        .get_all_properties_for_type(data_type)
        .iter()
        .any(|p| p.is_required && p.property_name.eq_ignore_ascii_case(property))
}

/// The `ImportMap` array, if the value has one.
pub(crate) fn import_map_array(value: &Value) -> Option<&Vec<Value>> {
    value.get(IMPORT_MAP_KEY).and_then(Value::as_array)
}

fn invalid(path: &Path, reason: &str) -> PersistenceError {
    PersistenceError::InvalidFormat {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn default_map_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// RFC 3339, or a timestamp without offset taken as UTC.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// `{"FilePath": "..."}` or a bare path string.
fn referenced_file(value: &Value) -> Option<ReferencedFileEntry> {
    let path = match value {
        Value::String(path) => path.as_str(),
        Value::Object(object) => object.get("FilePath")?.as_str()?,
        _ => return None,
    };
    (!path.trim().is_empty()).then(|| ReferencedFileEntry {
        file_path: PathBuf::from(path),
    })
}

fn source_table(value: &Value) -> Option<SourceTableEntry> {
    let file_path = value.get("FilePath")?.as_str()?.trim();
    let table_name = value.get("TableName")?.as_str()?.trim();
    if file_path.is_empty() || table_name.is_empty() {
        return None;
    }
    let columns = value
        .get("Columns")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    Some(SourceTableEntry {
        file_path: PathBuf::from(file_path),
        table_name: table_name.to_string(),
        columns,
    })
}

fn import_map_entry(value: &Value) -> Option<ImportMapEntry> {
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let required = value
        .get("Required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Some(ImportMapEntry {
        target_type: field("TargetType")?,
        property_name: field("PropertyName")?,
        column_header: field("ColumnHeader")?,
        required,
        severity: Severity::for_required(required),
    })
}
