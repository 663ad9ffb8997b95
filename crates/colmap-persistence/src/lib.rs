//! JSON map files for the column mapping engine.
//!
//! # Features
//!
//! - **Atomic writes**: temp file + rename, so a crash never leaves a
//!   half-written map
//! - **Tolerant loads**: a file holding only `ImportMap` is a valid map;
//!   legacy `ReferencedFiles` strings and incomplete entries are accepted
//! - **Cheap shape checks** with [`is_valid_map_file`] before a full load
//!
//! # Example
//!
//! ```ignore
//! use colmap_map::MappingDocument;
//! use colmap_persistence::{load_map, save_map};
//!
//! let mut doc = MappingDocument::new("network");
//! doc.update_mapping("Bus", "Id", "Bus ID")?;
//! save_map(&mut doc, Path::new("network.json"), |_, property| property == "Id")?;
//!
//! let loaded = load_map(Path::new("network.json"))?;
//! ```

mod error;
mod format;
mod load;
mod save;

pub use error::{PersistenceError, Result};
pub use format::{
    ImportMapEntry, MAP_VERSION, MapFile, ReferencedFileEntry, SOFTWARE_VERSION, Severity,
    SourceTableEntry,
};
pub use load::{is_valid_map_file, load_map, load_map_async, read_map_file};
pub use save::{save_map, save_map_async, save_map_file, save_map_with_catalog, write_map_file};
