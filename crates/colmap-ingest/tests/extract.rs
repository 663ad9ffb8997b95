use std::fs;
use std::path::Path;

use colmap_ingest::{
    IngestError, SAMPLE_ROW_LIMIT, extract_columns, extract_columns_or_empty, get_sample_data,
    table_references,
};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

#[test]
fn csv_has_single_implicit_table() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "buses.csv", "Id,Name,Voltage\n1,Alpha,110\n2,Beta,\n");

    let tables = extract_columns(&path).expect("extract");
    assert_eq!(tables.len(), 1);
    let columns = tables.get("buses").expect("implicit table");
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0].column_name, "Id");
    assert_eq!(columns[0].column_index, 0);
    assert_eq!(columns[0].source_table, "buses");
    assert_eq!(columns[2].sample_value_count, 1);
}

#[test]
fn sample_count_is_bounded() {
    let dir = TempDir::new().unwrap();
    let mut content = String::from("Id\n");
    for i in 0..(SAMPLE_ROW_LIMIT * 3) {
        content.push_str(&format!("{i}\n"));
    }
    let path = write_file(&dir, "big.csv", &content);

    let tables = extract_columns(&path).expect("extract");
    assert_eq!(tables["big"][0].sample_value_count, SAMPLE_ROW_LIMIT);
}

#[test]
fn tsv_uses_tab_delimiter() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "loads.tsv", "Bus\tP (MW)\nA\t10\n");

    let tables = extract_columns(&path).expect("extract");
    let names: Vec<_> = tables["loads"]
        .iter()
        .map(|c| c.column_name.as_str())
        .collect();
    assert_eq!(names, vec!["Bus", "P (MW)"]);
}

#[test]
fn missing_file_is_not_found() {
    let result = extract_columns(Path::new("/no/such/file.csv"));
    assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
}

#[test]
fn unsupported_extension_is_distinct_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "notes.pdf", "hello");

    let err = extract_columns(&path).unwrap_err();
    assert!(err.is_unsupported_format());
}

#[test]
fn corrupt_workbook_is_read_failure() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.xlsx", "this is not a zip archive");

    let result = extract_columns(&path);
    assert!(matches!(result, Err(IngestError::Workbook { .. })));
}

#[test]
fn failed_extraction_can_degrade_to_empty() {
    let tables = extract_columns_or_empty(Path::new("/no/such/file.csv"));
    assert!(tables.is_empty());
}

#[test]
fn preview_returns_requested_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "buses.csv", "Id,Name\n1,A\n2,B\n3,C\n");

    let sample = get_sample_data(&path, "buses", 2).expect("preview");
    assert_eq!(sample.table_name, "buses");
    assert_eq!(sample.headers, vec!["Id", "Name"]);
    assert_eq!(sample.rows.len(), 2);
    assert_eq!(sample.rows[1], vec!["2", "B"]);
}

#[test]
fn preview_of_unknown_csv_table_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "buses.csv", "Id\n1\n");

    let result = get_sample_data(&path, "Lines", 5);
    assert!(matches!(result, Err(IngestError::TableNotFound { .. })));
}

#[test]
fn table_references_use_display_key() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "buses.csv", "Id\n1\n");
    let tables = extract_columns(&path).expect("extract");

    let references = table_references(&path, &tables);
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].display_name(), "buses.csv | buses");
    assert!(!references[0].is_multi_table_file);
}
