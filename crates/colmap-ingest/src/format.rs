//! Source format detection by file extension.

use std::path::Path;

use crate::error::{IngestError, Result};

/// Extensions accepted as delimited text.
pub const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Extensions accepted as spreadsheet workbooks.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Tabular format of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Single-table delimited text.
    Delimited { delimiter: u8 },
    /// Workbook where each non-empty worksheet is a table.
    Workbook,
}

impl SourceFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "tsv" => Ok(Self::Delimited { delimiter: b'\t' }),
            ext if DELIMITED_EXTENSIONS.contains(&ext) => Ok(Self::Delimited { delimiter: b',' }),
            ext if WORKBOOK_EXTENSIONS.contains(&ext) => Ok(Self::Workbook),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    pub fn is_multi_table(&self) -> bool {
        matches!(self, Self::Workbook)
    }
}

/// True if the path has a supported extension.
pub fn is_supported(path: &Path) -> bool {
    SourceFormat::from_path(path).is_ok()
}
