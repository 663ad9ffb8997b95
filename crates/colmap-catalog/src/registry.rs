//! Statically declared schema registry.
//!
//! The registry is the explicit, versionable list of target types and their
//! mappable fields. It is loaded from TOML or built in code and then handed
//! to the [`SchemaCatalog`](crate::SchemaCatalog).
//!
//! ```toml
//! [[types]]
//! name = "Bus"
//! plural = "Buses"
//! description = "Network node"
//!
//! [[types.fields]]
//! name = "Id"
//! type = "string"
//! required = true
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Registry shipped with the crate, used when no registry file is given.
pub const BUILTIN_REGISTRY: &str = include_str!("../data/registry.toml");

/// One field of a target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit required marker.
    #[serde(default)]
    pub required: bool,
    /// Derived field; always visible.
    #[serde(default)]
    pub computed: bool,
    /// Hidden unless settings list it explicitly (or use the wildcard).
    #[serde(default)]
    pub hidden: bool,
}

fn default_field_type() -> String {
    "string".to_string()
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            description: None,
            required: false,
            computed: false,
            hidden: false,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A target record type and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub name: String,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plural: None,
            description: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Declared plural, or the name with an `s` appended.
    pub fn plural_name(&self) -> String {
        self.plural
            .clone()
            .unwrap_or_else(|| format!("{}s", self.name))
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    types: Vec<TypeSchema>,
}

/// The set of target types known to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    types: Vec<TypeSchema>,
}

impl SchemaRegistry {
    /// Builds a registry, rejecting empty or duplicate names.
    pub fn new(types: Vec<TypeSchema>) -> Result<Self> {
        let mut seen_types = BTreeSet::new();
        for schema in &types {
            let type_key = schema.name.trim().to_ascii_lowercase();
            if type_key.is_empty() {
                return Err(CatalogError::InvalidRegistry {
                    message: "type with empty name".to_string(),
                });
            }
            if !seen_types.insert(type_key) {
                return Err(CatalogError::DuplicateType {
                    name: schema.name.clone(),
                });
            }

            let mut seen_fields = BTreeSet::new();
            for field in &schema.fields {
                let field_key = field.name.trim().to_ascii_lowercase();
                if field_key.is_empty() {
                    return Err(CatalogError::InvalidRegistry {
                        message: format!("field with empty name in type '{}'", schema.name),
                    });
                }
                if !seen_fields.insert(field_key) {
                    return Err(CatalogError::DuplicateField {
                        data_type: schema.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }
        Ok(Self { types })
    }

    /// Parses a registry from TOML text. `origin` is used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        let file: RegistryFile = toml::from_str(content).map_err(|source| CatalogError::Toml {
            path: origin.to_path_buf(),
            source,
        })?;
        Self::new(file.types)
    }

    /// Loads a registry file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let registry = Self::from_toml_str(&content, path)?;
        tracing::info!(
            path = %path.display(),
            types = registry.types.len(),
            "Loaded schema registry"
        );
        Ok(registry)
    }

    /// The registry embedded in this crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_REGISTRY, Path::new("<builtin>"))
    }

    pub fn types(&self) -> &[TypeSchema] {
        &self.types
    }

    /// Finds a type by name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&TypeSchema> {
        let name = name.trim();
        self.types
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_loads() {
        let registry = SchemaRegistry::builtin().expect("builtin registry");
        assert!(registry.contains("Bus"));
        assert!(registry.contains("bus"));
        let bus = registry.find("Bus").unwrap();
        assert!(bus.fields.iter().any(|f| f.required));
    }

    #[test]
    fn test_parses_toml() {
        let toml = r#"
            [[types]]
            name = "Bus"
            plural = "Buses"

            [[types.fields]]
            name = "Id"
            required = true

            [[types.fields]]
            name = "Zone"
            type = "integer"
            hidden = true
        "#;
        let registry = SchemaRegistry::from_toml_str(toml, Path::new("test.toml")).unwrap();
        let bus = registry.find("Bus").unwrap();
        assert_eq!(bus.plural_name(), "Buses");
        assert_eq!(bus.fields[0].field_type, "string");
        assert!(bus.fields[0].required);
        assert!(bus.fields[1].hidden);
    }

    #[test]
    fn test_rejects_duplicate_types() {
        let result = SchemaRegistry::new(vec![TypeSchema::new("Bus"), TypeSchema::new("BUS")]);
        assert!(matches!(result, Err(CatalogError::DuplicateType { .. })));
    }

    #[test]
    fn test_rejects_duplicate_fields() {
        let schema = TypeSchema::new("Bus")
            .field(FieldDescriptor::new("Id", "string"))
            .field(FieldDescriptor::new("id", "string"));
        let result = SchemaRegistry::new(vec![schema]);
        assert!(matches!(result, Err(CatalogError::DuplicateField { .. })));
    }

    #[test]
    fn test_default_plural() {
        assert_eq!(TypeSchema::new("Line").plural_name(), "Lines");
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let err = SchemaRegistry::from_toml_str("[[types]\n", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
