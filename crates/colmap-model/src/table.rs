use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Separator between file name and table name in a display key.
pub const DISPLAY_SEPARATOR: &str = " | ";

/// One table inside a referenced source file.
///
/// The display name (`"FileName | TableName"`) is the stable key stored in
/// the mapping document to restore the selected source table per type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableReference {
    pub file_name: String,
    pub file_path: PathBuf,
    pub table_name: String,
    pub is_multi_table_file: bool,
}

impl TableReference {
    pub fn new(file_path: impl Into<PathBuf>, table_name: impl Into<String>) -> Self {
        let file_path = file_path.into();
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            file_name,
            file_path,
            table_name: table_name.into(),
            is_multi_table_file: false,
        }
    }

    #[must_use]
    pub fn multi_table(mut self, is_multi_table_file: bool) -> Self {
        self.is_multi_table_file = is_multi_table_file;
        self
    }

    pub fn display_name(&self) -> String {
        format!("{}{DISPLAY_SEPARATOR}{}", self.file_name, self.table_name)
    }

    /// Splits a display key back into `(file_name, table_name)`.
    ///
    /// The split happens on the first separator; table names may contain it.
    pub fn parse_display_name(display: &str) -> Option<(&str, &str)> {
        let (file, table) = display.split_once(DISPLAY_SEPARATOR)?;
        if file.is_empty() || table.is_empty() {
            return None;
        }
        Some((file, table))
    }

    pub fn matches_display_name(&self, display: &str) -> bool {
        Self::parse_display_name(display)
            .is_some_and(|(file, table)| file == self.file_name && table == self.table_name)
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{DISPLAY_SEPARATOR}{}", self.file_name, self.table_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_round_trips() {
        let table = TableReference::new("/data/network.xlsx", "Buses").multi_table(true);
        let display = table.display_name();
        assert_eq!(display, "network.xlsx | Buses");
        assert_eq!(
            TableReference::parse_display_name(&display),
            Some(("network.xlsx", "Buses"))
        );
        assert!(table.matches_display_name(&display));
    }

    #[test]
    fn parse_rejects_keys_without_separator() {
        assert_eq!(TableReference::parse_display_name("network.xlsx"), None);
        assert_eq!(TableReference::parse_display_name(" | Buses"), None);
    }
}
