//! Recorded column snapshot of the registered source files.
//!
//! Columns are captured when a file is registered so that later decisions
//! (which mappings depended on a removed file) never need to read the file
//! again. The file may be gone by then.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use colmap_ingest::{ExtractedTables, extract_columns, table_references};
use colmap_model::{ColumnInfo, TableReference};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableSnapshot {
    reference: TableReference,
    columns: Vec<ColumnInfo>,
}

/// Columns per table of every registered source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceColumns {
    tables: BTreeMap<(PathBuf, String), TableSnapshot>,
}

impl SourceColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts and records the tables of `path`.
    pub fn register_file(&mut self, path: &Path) -> Result<Vec<TableReference>> {
        let tables = extract_columns(path)?;
        Ok(self.record(path, &tables))
    }

    /// Records already extracted tables of `path`, replacing any earlier
    /// snapshot of that file.
    pub fn record(&mut self, path: &Path, tables: &ExtractedTables) -> Vec<TableReference> {
        self.remove_file(path);
        let references = table_references(path, tables);
        for reference in &references {
            let columns = tables
                .get(&reference.table_name)
                .cloned()
                .unwrap_or_default();
            self.tables.insert(
                (path.to_path_buf(), reference.table_name.clone()),
                TableSnapshot {
                    reference: reference.clone(),
                    columns,
                },
            );
        }
        tracing::debug!(
            path = %path.display(),
            tables = references.len(),
            "Recorded source columns"
        );
        references
    }

    /// Records a file from column names alone, as restored from a saved map.
    pub fn record_names(
        &mut self,
        path: &Path,
        tables: &BTreeMap<String, Vec<String>>,
    ) -> Vec<TableReference> {
        let tables: ExtractedTables = tables
            .iter()
            .map(|(table, names)| {
                let columns = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| ColumnInfo::new(name.as_str(), i, table.as_str()))
                    .collect();
                (table.clone(), columns)
            })
            .collect();
        self.record(path, &tables)
    }

    /// Forgets a file, returning its table references.
    pub fn remove_file(&mut self, path: &Path) -> Vec<TableReference> {
        let keys: Vec<_> = self
            .tables
            .keys()
            .filter(|(file, _)| file == path)
            .cloned()
            .collect();
        keys.into_iter()
            .filter_map(|key| self.tables.remove(&key))
            .map(|snapshot| snapshot.reference)
            .collect()
    }

    /// All recorded tables.
    pub fn tables(&self) -> impl Iterator<Item = &TableReference> {
        self.tables.values().map(|s| &s.reference)
    }

    /// Every recorded table with its columns.
    pub fn snapshots(&self) -> impl Iterator<Item = (&TableReference, &[ColumnInfo])> {
        self.tables
            .values()
            .map(|s| (&s.reference, s.columns.as_slice()))
    }

    pub fn tables_for_file(&self, path: &Path) -> Vec<&TableReference> {
        self.tables
            .values()
            .filter(|s| s.reference.file_path == path)
            .map(|s| &s.reference)
            .collect()
    }

    /// Table for a `"FileName | TableName"` display key.
    pub fn table(&self, display_name: &str) -> Option<&TableReference> {
        self.tables
            .values()
            .map(|s| &s.reference)
            .find(|r| r.matches_display_name(display_name))
    }

    /// Columns of the table with the given display key.
    pub fn columns(&self, display_name: &str) -> Option<&[ColumnInfo]> {
        self.tables
            .values()
            .find(|s| s.reference.matches_display_name(display_name))
            .map(|s| s.columns.as_slice())
    }

    /// Lowercased column names across the tables of one file.
    pub fn column_names_in_file(&self, path: &Path) -> BTreeSet<String> {
        self.column_names(|file| file == path)
    }

    /// Lowercased column names across the tables of every other file.
    pub fn column_names_outside_file(&self, path: &Path) -> BTreeSet<String> {
        self.column_names(|file| file != path)
    }

    fn column_names(&self, include: impl Fn(&Path) -> bool) -> BTreeSet<String> {
        self.tables
            .values()
            .filter(|s| include(&s.reference.file_path))
            .flat_map(|s| &s.columns)
            .map(|c| c.column_name.to_lowercase())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(entries: &[(&str, &[&str])]) -> ExtractedTables {
        entries
            .iter()
            .map(|(table, names)| {
                let columns = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| ColumnInfo::new(*name, i, *table))
                    .collect();
                ((*table).to_string(), columns)
            })
            .collect()
    }

    #[test]
    fn test_record_and_lookup_by_display_name() {
        let mut sources = SourceColumns::new();
        let refs = sources.record(
            Path::new("/data/network.xlsx"),
            &tables(&[("Buses", &["Id", "Name"]), ("Lines", &["Id", "From"])]),
        );
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| r.is_multi_table_file));

        let columns = sources.columns("network.xlsx | Lines").unwrap();
        assert_eq!(columns[1].column_name, "From");
        assert!(sources.table("network.xlsx | Loads").is_none());
    }

    #[test]
    fn test_remove_file_forgets_its_tables() {
        let mut sources = SourceColumns::new();
        sources.record(Path::new("/data/a.csv"), &tables(&[("a", &["Id"])]));
        sources.record(Path::new("/data/b.csv"), &tables(&[("b", &["Id", "Zone"])]));

        assert_eq!(
            sources.column_names_outside_file(Path::new("/data/b.csv")),
            BTreeSet::from(["id".to_string()])
        );
        let removed = sources.remove_file(Path::new("/data/b.csv"));
        assert_eq!(removed.len(), 1);
        assert!(sources.tables_for_file(Path::new("/data/b.csv")).is_empty());
        assert_eq!(sources.tables().count(), 1);
    }

    #[test]
    fn test_recorded_names_restore_a_snapshot() {
        let mut original = SourceColumns::new();
        original.record(
            Path::new("/data/network.xlsx"),
            &tables(&[("Buses", &["Id", "Name"]), ("Lines", &["Id", "From"])]),
        );

        let mut by_file: BTreeMap<PathBuf, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for (reference, columns) in original.snapshots() {
            by_file
                .entry(reference.file_path.clone())
                .or_default()
                .insert(
                    reference.table_name.clone(),
                    columns.iter().map(|c| c.column_name.clone()).collect(),
                );
        }
        let mut restored = SourceColumns::new();
        for (path, tables) in &by_file {
            restored.record_names(path, tables);
        }

        assert_eq!(restored.snapshots().count(), 2);
        assert!(restored.tables().all(|r| r.is_multi_table_file));
        assert_eq!(
            restored.column_names_in_file(Path::new("/data/network.xlsx")),
            original.column_names_in_file(Path::new("/data/network.xlsx"))
        );
        assert_eq!(
            restored.columns("network.xlsx | Lines").unwrap()[1].column_name,
            "From"
        );
    }
}
