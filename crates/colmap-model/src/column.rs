use serde::{Deserialize, Serialize};

/// A source column discovered in a table header.
///
/// Produced by the column extractor and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Trimmed header text (synthesized as `ColumnN` when blank).
    pub column_name: String,
    /// Zero-based position in the header row.
    pub column_index: usize,
    /// Table the column belongs to (worksheet name, or the implicit CSV table).
    pub source_table: String,
    /// Non-empty values seen in the bounded sample of data rows.
    pub sample_value_count: usize,
}

impl ColumnInfo {
    pub fn new(
        column_name: impl Into<String>,
        column_index: usize,
        source_table: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            column_index,
            source_table: source_table.into(),
            sample_value_count: 0,
        }
    }

    #[must_use]
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_value_count = count;
        self
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.column_name.eq_ignore_ascii_case(name.trim())
    }
}
