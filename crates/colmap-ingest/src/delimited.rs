//! Delimited text (CSV/TSV) header and sample reading.
//!
//! Only the header row and a bounded number of data rows are read. Records
//! are read as bytes and decoded lossily so a stray non-UTF-8 byte does not
//! fail the whole file.

use std::fs::File;
use std::path::Path;

use csv::{ByteRecord, Reader, ReaderBuilder, Trim};

use colmap_model::ColumnInfo;

use crate::error::{IngestError, Result};
use crate::header::{build_columns, fit_row, normalize_header_row};

/// Name used for the single table of a delimited file.
pub fn implicit_table_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("Table")
        .to_string()
}

fn open_reader(path: &Path, delimiter: u8) -> Result<Reader<File>> {
    let file = File::open(path).map_err(|e| IngestError::from_io(path, e))?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file))
}

fn decode(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Reads the header row, skipping leading blank lines.
fn read_header(reader: &mut Reader<File>, path: &Path) -> Result<Vec<String>> {
    let mut record = ByteRecord::new();
    loop {
        let has_record = reader.read_byte_record(&mut record).map_err(|e| {
            IngestError::CsvParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        if !has_record {
            return Err(IngestError::NoHeader {
                path: path.to_path_buf(),
            });
        }
        let header = normalize_header_row(&decode(&record));
        if !header.is_empty() {
            return Ok(header);
        }
    }
}

/// Iterates decoded data rows, stopping quietly at the first malformed record.
fn data_rows<'r>(
    reader: &'r mut Reader<File>,
    path: &'r Path,
) -> impl Iterator<Item = Vec<String>> + 'r {
    reader.byte_records().map_while(move |result| match result {
        Ok(record) => Some(decode(&record)),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Stopped reading rows at malformed record"
            );
            None
        }
    })
}

/// Extracts column descriptors from a delimited file.
pub fn read_delimited_columns(path: &Path, delimiter: u8) -> Result<Vec<ColumnInfo>> {
    let mut reader = open_reader(path, delimiter)?;
    let header = read_header(&mut reader, path)?;
    let table = implicit_table_name(path);
    Ok(build_columns(&table, &header, data_rows(&mut reader, path)))
}

/// Reads the header and up to `max_rows` data rows.
pub fn read_delimited_sample(
    path: &Path,
    delimiter: u8,
    max_rows: usize,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = open_reader(path, delimiter)?;
    let header = read_header(&mut reader, path)?;
    let width = header.len();
    let rows = data_rows(&mut reader, path)
        .take(max_rows)
        .map(|row| fit_row(row, width))
        .collect();
    Ok((header, rows))
}
