//! Schema catalog: settings-filtered view over the schema registry.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use colmap_model::{PropertyInfo, Visibility};

use crate::error::{CatalogError, Result};
use crate::registry::{FieldDescriptor, SchemaRegistry, TypeSchema};
use crate::required::is_required;
use crate::settings::{MappingSettings, SettingsEvent, SettingsProvider};

/// Enumerates target types and their mappable fields.
///
/// Visible properties are memoized per type. The cache is never expired
/// implicitly; it is invalidated by [`handle_event`](Self::handle_event)
/// for the type a settings change names.
#[derive(Debug)]
pub struct SchemaCatalog<S = MappingSettings> {
    registry: Arc<SchemaRegistry>,
    settings: S,
    visible_cache: RwLock<BTreeMap<String, Vec<PropertyInfo>>>,
}

fn cache_key(data_type: &str) -> String {
    data_type.trim().to_ascii_lowercase()
}

impl<S: SettingsProvider> SchemaCatalog<S> {
    pub fn new(registry: Arc<SchemaRegistry>, settings: S) -> Self {
        Self {
            registry,
            settings,
            visible_cache: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    // =========================================================================
    // Type queries
    // =========================================================================

    /// Names of the enabled target types, in registry order.
    pub fn available_data_types(&self) -> Vec<String> {
        self.registry
            .types()
            .iter()
            .filter(|t| self.settings.is_type_enabled(&t.name))
            .map(|t| t.name.clone())
            .collect()
    }

    pub fn is_valid_data_type(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn get_data_type_description(&self, data_type: &str) -> Option<String> {
        self.registry
            .find(data_type)
            .and_then(|t| t.description.clone())
    }

    /// Canonical (registry) spelling of a type name.
    pub fn canonical_name(&self, data_type: &str) -> Option<&str> {
        self.registry.find(data_type).map(|t| t.name.as_str())
    }

    pub fn plural_name(&self, data_type: &str) -> Option<String> {
        self.registry.find(data_type).map(TypeSchema::plural_name)
    }

    // =========================================================================
    // Property queries
    // =========================================================================

    /// Fields visible under the current settings.
    ///
    /// An unknown type yields an empty list. Disabled types have no visible
    /// fields.
    pub fn get_properties_for_type(&self, data_type: &str) -> Vec<PropertyInfo> {
        self.try_properties_for_type(data_type).unwrap_or_else(|e| {
            tracing::debug!(data_type, error = %e, "No properties for type");
            Vec::new()
        })
    }

    /// Like [`get_properties_for_type`](Self::get_properties_for_type), but
    /// reports unknown types.
    pub fn try_properties_for_type(&self, data_type: &str) -> Result<Vec<PropertyInfo>> {
        let key = cache_key(data_type);
        if let Some(cached) = self
            .visible_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(cached.clone());
        }

        let schema = self.find_schema(data_type)?;
        let properties = self.visible_properties(schema);
        self.visible_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, properties.clone());
        Ok(properties)
    }

    /// Every field of the type, ignoring visibility.
    pub fn get_all_properties_for_type(&self, data_type: &str) -> Vec<PropertyInfo> {
        self.try_all_properties_for_type(data_type)
            .unwrap_or_default()
    }

    pub fn try_all_properties_for_type(&self, data_type: &str) -> Result<Vec<PropertyInfo>> {
        let schema = self.find_schema(data_type)?;
        Ok(schema
            .fields
            .iter()
            .map(|f| self.to_property(&schema.name, f))
            .collect())
    }

    /// Names of the required fields among the visible ones.
    pub fn required_properties(&self, data_type: &str) -> Vec<String> {
        self.get_properties_for_type(data_type)
            .into_iter()
            .filter(|p| p.is_required)
            .map(|p| p.property_name)
            .collect()
    }

    pub fn is_property_visible(&self, data_type: &str, property: &str) -> bool {
        self.get_properties_for_type(data_type)
            .iter()
            .any(|p| p.property_name.eq_ignore_ascii_case(property))
    }

    fn find_schema(&self, data_type: &str) -> Result<&TypeSchema> {
        self.registry
            .find(data_type)
            .ok_or_else(|| CatalogError::TypeNotFound {
                name: data_type.to_string(),
            })
    }

    fn visible_properties(&self, schema: &TypeSchema) -> Vec<PropertyInfo> {
        if !self.settings.is_type_enabled(&schema.name) {
            return Vec::new();
        }
        let visibility = self.settings.visibility(&schema.name);
        schema
            .fields
            .iter()
            .filter(|f| is_visible(f, visibility.as_ref()))
            .map(|f| self.to_property(&schema.name, f))
            .collect()
    }

    fn to_property(&self, data_type: &str, field: &FieldDescriptor) -> PropertyInfo {
        let mut property = PropertyInfo::new(&field.name, &field.field_type);
        property.description = field.description.clone();
        property.is_required = is_required(self.settings.required_policy(), data_type, field);
        property.is_computed = field.computed;
        property
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Applies a settings change notification to the cache.
    pub fn handle_event(&self, event: &SettingsEvent) {
        let mut cache = self
            .visible_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match event {
            SettingsEvent::VisibilityChanged { data_type }
            | SettingsEvent::TypeEnablementChanged { data_type } => {
                cache.remove(&cache_key(data_type));
                tracing::debug!(data_type = %data_type, "Invalidated property cache");
            }
            SettingsEvent::RequiredPolicyChanged => {
                cache.clear();
                tracing::debug!("Invalidated property cache for all types");
            }
            SettingsEvent::Unchanged => {}
        }
    }

    /// Mutates the owned settings and invalidates what the change affected.
    pub fn update_settings<F>(&mut self, change: F) -> SettingsEvent
    where
        F: FnOnce(&mut S) -> SettingsEvent,
    {
        let event = change(&mut self.settings);
        self.handle_event(&event);
        event
    }

    #[cfg(test)]
    fn is_cached(&self, data_type: &str) -> bool {
        self.visible_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&cache_key(data_type))
    }
}

impl SchemaCatalog<MappingSettings> {
    /// Catalog over the built-in registry with default settings.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(
            Arc::new(SchemaRegistry::builtin()?),
            MappingSettings::default(),
        ))
    }
}

/// Computed fields are always visible. Without explicit settings, fields not
/// marked hidden are visible.
fn is_visible(field: &FieldDescriptor, visibility: Option<&Visibility>) -> bool {
    if field.computed {
        return true;
    }
    match visibility {
        None => !field.hidden,
        Some(visibility) => visibility.allows(&field.name),
    }
}
