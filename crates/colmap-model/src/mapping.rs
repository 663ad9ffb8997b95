use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One field-to-column binding within a target type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub property_name: String,
    pub column_header: String,
    /// Score of an automatic mapping; `None` means user-confirmed.
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl MappingEntry {
    pub fn manual(property_name: impl Into<String>, column_header: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            column_header: column_header.into(),
            confidence: None,
        }
    }

    pub fn automatic(
        property_name: impl Into<String>,
        column_header: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            column_header: column_header.into(),
            confidence: Some(confidence.clamp(0.0, 1.0)),
        }
    }

    pub fn is_manual(&self) -> bool {
        self.confidence.is_none()
    }
}

/// Availability of a referenced source file on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    #[default]
    Unknown,
    Available,
    Missing,
}

/// A source file registered with a mapping document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedFile {
    pub file_path: PathBuf,
    #[serde(default)]
    pub status: FileStatus,
}

impl ReferencedFile {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            status: FileStatus::Unknown,
        }
    }

    pub fn file_name(&self) -> &str {
        self.file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}
