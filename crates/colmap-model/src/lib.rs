//! Shared data model for the column mapping engine.
//!
//! These types flow between the column extractor, the schema catalog,
//! the mapping document and the serializer. None of them perform I/O.

pub mod column;
pub mod mapping;
pub mod property;
pub mod table;
pub mod visibility;

pub use column::ColumnInfo;
pub use mapping::{FileStatus, MappingEntry, ReferencedFile};
pub use property::PropertyInfo;
pub use table::TableReference;
pub use visibility::Visibility;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_entry_serializes() {
        let entry = MappingEntry::manual("BusName", "Name");
        let json = serde_json::to_string(&entry).expect("serialize entry");
        let round: MappingEntry = serde_json::from_str(&json).expect("deserialize entry");
        assert_eq!(round, entry);
        assert!(round.is_manual());
    }

    #[test]
    fn referenced_file_defaults_to_unknown_status() {
        let json = r#"{"file_path":"/data/buses.csv"}"#;
        let file: ReferencedFile = serde_json::from_str(json).expect("deserialize file");
        assert_eq!(file.status, FileStatus::Unknown);
    }
}
