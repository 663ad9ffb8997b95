use serde::{Deserialize, Serialize};

/// A mappable field of a target type, as exposed by the schema catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub property_name: String,
    pub property_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_computed: bool,
}

impl PropertyInfo {
    pub fn new(property_name: impl Into<String>, property_type: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            property_type: property_type.into(),
            description: None,
            is_required: false,
            is_computed: false,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    #[must_use]
    pub fn computed(mut self) -> Self {
        self.is_computed = true;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the description when it carries any text.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}
