//! Column extraction entry points.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use colmap_model::{ColumnInfo, TableReference};

use crate::delimited::{implicit_table_name, read_delimited_columns, read_delimited_sample};
use crate::error::{IngestError, Result};
use crate::format::SourceFormat;
use crate::workbook::{read_workbook_columns, read_workbook_sample};

/// Columns per table name, as returned by [`extract_columns`].
pub type ExtractedTables = BTreeMap<String, Vec<ColumnInfo>>;

/// A small preview grid of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleData {
    pub table_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn ensure_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Reads table headers and bounded sample counts from a source file.
///
/// Delimited files produce one table named after the file stem. Workbooks
/// produce one table per non-empty worksheet.
pub fn extract_columns(path: &Path) -> Result<ExtractedTables> {
    ensure_file(path)?;
    let format = SourceFormat::from_path(path)?;

    let tables = match format {
        SourceFormat::Delimited { delimiter } => {
            let columns = read_delimited_columns(path, delimiter)?;
            let mut tables = BTreeMap::new();
            tables.insert(implicit_table_name(path), columns);
            tables
        }
        SourceFormat::Workbook => read_workbook_columns(path)?,
    };

    tracing::debug!(
        path = %path.display(),
        tables = tables.len(),
        columns = tables.values().map(Vec::len).sum::<usize>(),
        "Extracted columns"
    );
    Ok(tables)
}

/// Like [`extract_columns`], but degrades to an empty result with a warning.
///
/// Used where the caller can continue without this file (e.g. refreshing
/// many files at once).
pub fn extract_columns_or_empty(path: &Path) -> ExtractedTables {
    extract_columns(path).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Column extraction failed");
        ExtractedTables::new()
    })
}

/// Returns a preview of up to `max_rows` data rows for one table.
pub fn get_sample_data(path: &Path, table_name: &str, max_rows: usize) -> Result<SampleData> {
    ensure_file(path)?;
    let format = SourceFormat::from_path(path)?;

    let (table_name, (headers, rows)) = match format {
        SourceFormat::Delimited { delimiter } => {
            let implicit = implicit_table_name(path);
            if !table_name.is_empty() && !table_name.eq_ignore_ascii_case(&implicit) {
                return Err(IngestError::TableNotFound {
                    path: path.to_path_buf(),
                    table: table_name.to_string(),
                });
            }
            (implicit, read_delimited_sample(path, delimiter, max_rows)?)
        }
        SourceFormat::Workbook => (
            table_name.to_string(),
            read_workbook_sample(path, table_name, max_rows)?,
        ),
    };

    Ok(SampleData {
        table_name,
        headers,
        rows,
    })
}

/// Builds table references for the tables extracted from `path`.
pub fn table_references(path: &Path, tables: &ExtractedTables) -> Vec<TableReference> {
    let multi = SourceFormat::from_path(path).is_ok_and(|f| f.is_multi_table());
    tables
        .keys()
        .map(|table| TableReference::new(path, table.clone()).multi_table(multi))
        .collect()
}
