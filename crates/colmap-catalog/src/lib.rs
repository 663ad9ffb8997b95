//! Schema catalog for the column mapping engine.
//!
//! Target types and their fields come from an explicit [`SchemaRegistry`]
//! (TOML or built in code). [`SchemaCatalog`] filters them through a
//! [`SettingsProvider`] for per-type enablement, field visibility and the
//! required-field policy, memoizing the visible set per type.

mod catalog;
mod error;
mod registry;
mod required;
mod settings;

// === Error Types ===
pub use error::{CatalogError, Result};

// === Registry ===
pub use registry::{BUILTIN_REGISTRY, FieldDescriptor, SchemaRegistry, TypeSchema};

// === Settings ===
pub use settings::{
    AutoMapSettings, IdentifierFallback, MappingSettings, RequiredPolicy, RequiredSettings,
    SettingsEvent, SettingsProvider, TypeSettings,
};

// === Catalog ===
pub use catalog::SchemaCatalog;
pub use required::is_required;
