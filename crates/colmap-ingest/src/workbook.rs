//! Spreadsheet workbook reading.
//!
//! Each non-empty worksheet is one table; the first row is its header.
//! A worksheet that fails to load is skipped with a warning so the rest of
//! the workbook stays usable.

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use colmap_model::ColumnInfo;

use crate::error::{IngestError, Result};
use crate::header::{SAMPLE_ROW_LIMIT, build_columns, fit_row, normalize_header_row};

/// Text of a single cell; numbers and dates use their display form.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn row_text(row: &[Data]) -> Vec<String> {
    row.iter().map(cell_text).collect()
}

/// Splits a worksheet range into a normalized header and at most
/// `max_rows` of its data rows.
///
/// Returns `None` when the sheet has no usable header.
pub fn split_range(
    range: &Range<Data>,
    max_rows: usize,
) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    if range.is_empty() {
        return None;
    }
    let mut rows = range.rows().map(row_text);
    let header = loop {
        let candidate = normalize_header_row(&rows.next()?);
        if !candidate.is_empty() {
            break candidate;
        }
    };
    Some((header, rows.take(max_rows).collect()))
}

/// Builds column descriptors for one worksheet range.
pub fn columns_from_range(table: &str, range: &Range<Data>) -> Option<Vec<ColumnInfo>> {
    let (header, rows) = split_range(range, SAMPLE_ROW_LIMIT)?;
    Some(build_columns(table, &header, rows))
}

fn open(path: &Path) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>> {
    open_workbook_auto(path).map_err(|e| IngestError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Extracts column descriptors for every non-empty worksheet.
pub fn read_workbook_columns(path: &Path) -> Result<BTreeMap<String, Vec<ColumnInfo>>> {
    let mut workbook = open(path)?;
    let mut tables = BTreeMap::new();

    for sheet in workbook.sheet_names() {
        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    sheet = %sheet,
                    error = %e,
                    "Skipping unreadable worksheet"
                );
                continue;
            }
        };
        match columns_from_range(&sheet, &range) {
            Some(columns) => {
                tables.insert(sheet, columns);
            }
            None => {
                tracing::debug!(path = %path.display(), sheet = %sheet, "Skipping empty worksheet");
            }
        }
    }

    Ok(tables)
}

/// Reads the header and up to `max_rows` data rows of one worksheet.
pub fn read_workbook_sample(
    path: &Path,
    table: &str,
    max_rows: usize,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open(path)?;
    let sheet = workbook
        .sheet_names()
        .into_iter()
        .find(|name| name == table || name.eq_ignore_ascii_case(table))
        .ok_or_else(|| IngestError::TableNotFound {
            path: path.to_path_buf(),
            table: table.to_string(),
        })?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| IngestError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let (header, rows) = split_range(&range, max_rows).ok_or_else(|| IngestError::NoHeader {
        path: path.to_path_buf(),
    })?;
    let width = header.len();
    let rows = rows
        .into_iter()
        .map(|row| fit_row(row, width))
        .collect();
    Ok((header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(cells: &[&[Data]]) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), value.clone());
            }
        }
        range
    }

    fn text(value: &str) -> Data {
        Data::String(value.to_string())
    }

    #[test]
    fn test_unnamed_columns_are_synthesized() {
        let range = sheet(&[
            &[text("Id"), Data::Empty, text("Name")],
            &[Data::Int(1), Data::Float(2.5), text("Alpha")],
        ]);
        let columns = columns_from_range("Buses", &range).unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, vec!["Id", "Column2", "Name"]);
        assert!(columns.iter().all(|c| c.sample_value_count == 1));
    }

    #[test]
    fn test_empty_sheet_is_skipped() {
        let range: Range<Data> = Range::empty();
        assert!(columns_from_range("Empty", &range).is_none());
    }

    #[test]
    fn test_blank_leading_rows_are_skipped() {
        let range = sheet(&[&[Data::Empty, Data::Empty], &[text("Id"), text("Name")]]);
        let (header, rows) = split_range(&range, SAMPLE_ROW_LIMIT).unwrap();
        assert_eq!(header, vec!["Id", "Name"]);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_long_sheet_reads_a_bounded_sample() {
        let mut range = Range::new((0, 0), (999, 1));
        range.set_value((0, 0), text("Id"));
        range.set_value((0, 1), text("Name"));
        for r in 1..1000 {
            range.set_value((r, 0), Data::Int(i64::from(r)));
            range.set_value((r, 1), text("bus"));
        }

        let (_, rows) = split_range(&range, 5).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][0], "1");

        let columns = columns_from_range("Buses", &range).unwrap();
        assert!(
            columns
                .iter()
                .all(|c| c.sample_value_count == SAMPLE_ROW_LIMIT)
        );
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&text("  x ")), "x");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_missing_workbook_is_an_error() {
        let result = read_workbook_columns(Path::new("/definitely/not/here.xlsx"));
        assert!(matches!(result, Err(IngestError::Workbook { .. })));
    }
}
