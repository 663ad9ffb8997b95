//! Header normalization and bounded sample counting.

use colmap_model::ColumnInfo;

/// Maximum number of data rows inspected for sample value counts.
pub const SAMPLE_ROW_LIMIT: usize = 100;

/// Default number of rows returned by a preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Normalizes a header value by trimming whitespace and a leading BOM.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}

/// Name given to a blank header cell at `index` (1-based in the name).
pub fn synthesized_name(index: usize) -> String {
    format!("Column{}", index + 1)
}

/// Normalizes a raw header row, synthesizing names for blank cells.
///
/// Trailing blank cells are dropped so ragged rows do not invent columns.
pub fn normalize_header_row(raw: &[String]) -> Vec<String> {
    let last_named = raw.iter().rposition(|v| !normalize_header(v).is_empty());
    let Some(last_named) = last_named else {
        return Vec::new();
    };
    raw[..=last_named]
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let name = normalize_header(value);
            if name.is_empty() {
                synthesized_name(idx)
            } else {
                name
            }
        })
        .collect()
}

/// Builds column descriptors from a header row and an iterator of data rows.
///
/// At most [`SAMPLE_ROW_LIMIT`] rows are consumed from `rows`.
pub fn build_columns<I>(table: &str, header: &[String], rows: I) -> Vec<ColumnInfo>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut counts = vec![0usize; header.len()];
    for row in rows.into_iter().take(SAMPLE_ROW_LIMIT) {
        for (idx, value) in row.iter().enumerate().take(header.len()) {
            if !value.trim().is_empty() {
                counts[idx] += 1;
            }
        }
    }

    header
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(idx, (name, count))| {
            ColumnInfo::new(name.clone(), idx, table).with_sample_count(count)
        })
        .collect()
}

/// Pads or truncates a data row to the header width, trimming each cell.
pub fn fit_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.truncate(width);
    for cell in &mut row {
        let trimmed = cell.trim();
        if trimmed.len() != cell.len() {
            *cell = trimmed.to_string();
        }
    }
    row.resize(width, String::new());
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  hello  "), "hello");
        assert_eq!(normalize_header("\u{feff}Id"), "Id");
    }

    #[test]
    fn test_blank_headers_are_synthesized() {
        let header = normalize_header_row(&strings(&["Id", " ", "Name"]));
        assert_eq!(header, vec!["Id", "Column2", "Name"]);
    }

    #[test]
    fn test_trailing_blank_headers_dropped() {
        let header = normalize_header_row(&strings(&["Id", "Name", "", "  "]));
        assert_eq!(header, vec!["Id", "Name"]);
    }

    #[test]
    fn test_all_blank_header_is_empty() {
        assert!(normalize_header_row(&strings(&["", " "])).is_empty());
    }

    #[test]
    fn test_build_columns_counts_non_empty_values() {
        let header = strings(&["Id", "Name"]);
        let rows = vec![
            strings(&["1", "Alpha"]),
            strings(&["2", ""]),
            strings(&["3"]),
        ];
        let columns = build_columns("Buses", &header, rows);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].sample_value_count, 3);
        assert_eq!(columns[1].sample_value_count, 1);
        assert_eq!(columns[1].column_index, 1);
        assert_eq!(columns[1].source_table, "Buses");
    }

    #[test]
    fn test_build_columns_stops_at_sample_limit() {
        let header = strings(&["Id"]);
        let rows = (0..SAMPLE_ROW_LIMIT + 50).map(|i| vec![i.to_string()]);
        let columns = build_columns("T", &header, rows);
        assert_eq!(columns[0].sample_value_count, SAMPLE_ROW_LIMIT);
    }

    #[test]
    fn test_fit_row() {
        assert_eq!(fit_row(strings(&[" a ", "b", "c"]), 2), vec!["a", "b"]);
        assert_eq!(fit_row(strings(&["a"]), 3), vec!["a", "", ""]);
    }
}
