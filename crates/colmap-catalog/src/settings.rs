//! Mapping settings - persisted user preferences.
//!
//! Settings are TOML in the user's config directory. A missing or unreadable
//! file yields defaults. Every mutation returns a [`SettingsEvent`] naming
//! what changed so the catalog can invalidate only the affected type.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use colmap_model::Visibility;

use crate::error::{CatalogError, Result};

// =============================================================================
// PROVIDER CONTRACT
// =============================================================================

/// Source of per-type enablement and field visibility.
pub trait SettingsProvider {
    /// Whether the type is offered for mapping at all.
    fn is_type_enabled(&self, data_type: &str) -> bool;

    /// Explicit visibility for a type, or `None` to use registry defaults.
    fn visibility(&self, data_type: &str) -> Option<Visibility>;

    /// How required fields are determined.
    fn required_policy(&self) -> &RequiredSettings;
}

/// A change notification emitted by settings mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    /// Field visibility of one type changed.
    VisibilityChanged { data_type: String },
    /// A type was enabled or disabled.
    TypeEnablementChanged { data_type: String },
    /// Required-field policy changed; affects every type.
    RequiredPolicyChanged,
    /// The mutation was a no-op.
    Unchanged,
}

// =============================================================================
// ROOT SETTINGS
// =============================================================================

/// Mapping settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingSettings {
    /// Per-type settings keyed by type name.
    pub types: BTreeMap<String, TypeSettings>,

    /// Required-field policy.
    pub required: RequiredSettings,

    /// Auto-mapper tuning.
    pub automap: AutoMapSettings,
}

/// Settings for one target type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `"*"` or a list of field names; absent means registry defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Visibility>,
}

impl Default for TypeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fields: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl MappingSettings {
    /// Load settings from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a specific path, reporting failures.
    pub fn try_load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        toml::from_str(&content).map_err(|source| CatalogError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save settings to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|source| CatalogError::Serialize { source })?;
        std::fs::write(path, content).map_err(|e| CatalogError::io(path, e))
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "colmap", "colmap")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    fn type_settings(&self, data_type: &str) -> Option<&TypeSettings> {
        self.types
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(data_type))
            .map(|(_, settings)| settings)
    }

    fn type_settings_mut(&mut self, data_type: &str) -> &mut TypeSettings {
        let key = self
            .types
            .keys()
            .find(|name| name.eq_ignore_ascii_case(data_type))
            .cloned()
            .unwrap_or_else(|| data_type.to_string());
        self.types.entry(key).or_default()
    }

    /// Sets the visible fields of a type.
    pub fn set_visibility(&mut self, data_type: &str, visibility: Visibility) -> SettingsEvent {
        let entry = self.type_settings_mut(data_type);
        if entry.fields.as_ref() == Some(&visibility) {
            return SettingsEvent::Unchanged;
        }
        entry.fields = Some(visibility);
        SettingsEvent::VisibilityChanged {
            data_type: data_type.to_string(),
        }
    }

    /// Reverts a type to registry-default visibility.
    pub fn reset_visibility(&mut self, data_type: &str) -> SettingsEvent {
        let entry = self.type_settings_mut(data_type);
        if entry.fields.take().is_none() {
            return SettingsEvent::Unchanged;
        }
        SettingsEvent::VisibilityChanged {
            data_type: data_type.to_string(),
        }
    }

    /// Enables or disables a type.
    pub fn set_type_enabled(&mut self, data_type: &str, enabled: bool) -> SettingsEvent {
        let entry = self.type_settings_mut(data_type);
        if entry.enabled == enabled {
            return SettingsEvent::Unchanged;
        }
        entry.enabled = enabled;
        SettingsEvent::TypeEnablementChanged {
            data_type: data_type.to_string(),
        }
    }

    /// Switches the required-field policy.
    pub fn set_required_policy(&mut self, policy: RequiredPolicy) -> SettingsEvent {
        if self.required.policy == policy {
            return SettingsEvent::Unchanged;
        }
        self.required.policy = policy;
        SettingsEvent::RequiredPolicyChanged
    }
}

impl SettingsProvider for MappingSettings {
    fn is_type_enabled(&self, data_type: &str) -> bool {
        self.type_settings(data_type).is_none_or(|s| s.enabled)
    }

    fn visibility(&self, data_type: &str) -> Option<Visibility> {
        self.type_settings(data_type)
            .and_then(|s| s.fields.clone())
    }

    fn required_policy(&self) -> &RequiredSettings {
        &self.required
    }
}

// =============================================================================
// REQUIRED FIELDS
// =============================================================================

/// Strategy for deciding which fields are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequiredPolicy {
    /// A field is required iff the registry marks it `required`.
    #[default]
    Marker,
    /// Legacy: a universal name set unioned with a per-type table.
    ///
    /// Kept for maps authored before registry markers existed. The tables
    /// must be kept in sync with the registry by hand.
    Legacy,
}

/// Required-field policy and the legacy name tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredSettings {
    pub policy: RequiredPolicy,
    /// Legacy: names required on every type.
    pub universal: Vec<String>,
    /// Legacy: additional required names per type.
    pub per_type: BTreeMap<String, Vec<String>>,
}

impl Default for RequiredSettings {
    fn default() -> Self {
        Self {
            policy: RequiredPolicy::Marker,
            universal: vec!["Id".to_string()],
            per_type: BTreeMap::new(),
        }
    }
}

impl RequiredSettings {
    /// Legacy lookup: universal names plus the per-type table.
    pub fn legacy_requires(&self, data_type: &str, field: &str) -> bool {
        let universal = self.universal.iter().any(|n| n.eq_ignore_ascii_case(field));
        let per_type = self
            .per_type
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(data_type))
            .flat_map(|(_, names)| names)
            .any(|n| n.eq_ignore_ascii_case(field));
        universal || per_type
    }
}

// =============================================================================
// AUTO-MAP
// =============================================================================

/// What to do with an identifier-like field the fuzzy pass left unmapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierFallback {
    /// Bind to the first remaining column, then try the name allow-list.
    #[default]
    FirstColumn,
    /// Only try the name allow-list.
    AllowListOnly,
    /// Never bind identifiers outside the fuzzy pass.
    Disabled,
}

/// Auto-mapper tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoMapSettings {
    /// Minimum score to accept a match.
    pub threshold: f64,
    /// Threshold for identifier-like fields matched to descriptor columns.
    pub guarded_threshold: f64,
    /// Scores below this are reported as no match rather than low confidence.
    pub report_floor: f64,
    pub identifier_fallback: IdentifierFallback,
    /// Column names accepted as identifiers when no columns remain.
    pub identifier_names: Vec<String>,
    /// Keywords marking a column as a descriptor rather than an identifier.
    pub generic_keywords: Vec<String>,
}

impl Default for AutoMapSettings {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            guarded_threshold: 0.85,
            report_floor: 0.4,
            identifier_fallback: IdentifierFallback::FirstColumn,
            identifier_names: ["ID", "Id Name", "Identifier", "UniqueID", "Unique ID", "Key"]
                .into_iter()
                .map(String::from)
                .collect(),
            generic_keywords: ["style", "type", "category", "class", "kind", "mode"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}
