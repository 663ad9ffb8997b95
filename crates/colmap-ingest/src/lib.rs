//! Column extraction for tabular source files.
//!
//! This crate reads just enough of a CSV/TSV file or spreadsheet workbook to
//! describe its tables: the header row, a sample value count per column over
//! the first rows, and a small preview grid. Full datasets are never loaded.
//!
//! # Features
//!
//! - **Delimited text**: trimmed, BOM-tolerant header read with ragged-row tolerance
//! - **Workbooks**: one table per non-empty worksheet, blank headers become `ColumnN`
//! - **Previews**: bounded sample grids for a chosen table
//! - **Discovery**: list the supported source files in a directory
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use colmap_ingest::{extract_columns, get_sample_data};
//!
//! let tables = extract_columns(Path::new("network.xlsx"))?;
//! let preview = get_sample_data(Path::new("network.xlsx"), "Buses", 5)?;
//! ```

mod delimited;
mod discovery;
mod error;
mod extract;
mod format;
mod header;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Extraction ===
pub use extract::{
    ExtractedTables, SampleData, extract_columns, extract_columns_or_empty, get_sample_data,
    table_references,
};
pub use header::{DEFAULT_PREVIEW_ROWS, SAMPLE_ROW_LIMIT};

// === Formats ===
pub use delimited::implicit_table_name;
pub use format::{DELIMITED_EXTENSIONS, SourceFormat, WORKBOOK_EXTENSIONS, is_supported};

// === File Discovery ===
pub use discovery::list_source_files;
