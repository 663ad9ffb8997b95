//! Confidence categories and per-type mapping summaries.

use colmap_catalog::{SchemaCatalog, SettingsProvider};
use colmap_model::MappingEntry;

use crate::document::MappingDocument;

/// Confidence level categories for auto-created mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceLevel {
    /// Weak match requiring manual confirmation.
    Low,
    /// Good match that should be verified.
    Medium,
    /// Near-certain match.
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

/// Boundaries between confidence levels.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceThresholds {
    /// Minimum confidence for high-quality matches (default: 0.95).
    pub high: f32,
    /// Minimum confidence for medium-quality matches (default: 0.80).
    pub medium: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.95,
            medium: 0.80,
        }
    }
}

impl ConfidenceThresholds {
    /// Categorizes an entry. Manual entries have no level.
    #[must_use]
    pub fn categorize(&self, entry: &MappingEntry) -> Option<ConfidenceLevel> {
        let confidence = entry.confidence?;
        Some(if confidence >= self.high {
            ConfidenceLevel::High
        } else if confidence >= self.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        })
    }
}

/// Summary of mapping counts for one type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingSummary {
    /// Visible fields of the type.
    pub total_fields: usize,
    /// Visible fields with a mapping.
    pub mapped: usize,
    /// Mapped fields created by the auto-mapper.
    pub automatic: usize,
    /// Mapped fields confirmed by the user.
    pub manual: usize,
    pub required_total: usize,
    pub required_mapped: usize,
}

impl MappingSummary {
    /// Builds the summary of `data_type` against its visible fields.
    pub fn for_type<S: SettingsProvider>(
        catalog: &SchemaCatalog<S>,
        document: &MappingDocument,
        data_type: &str,
    ) -> Self {
        let mut summary = Self::default();
        for property in catalog.get_properties_for_type(data_type) {
            summary.total_fields += 1;
            let mapping = document.mapping_for(data_type, &property.property_name);
            if property.is_required {
                summary.required_total += 1;
            }
            let Some(entry) = mapping else {
                continue;
            };
            summary.mapped += 1;
            if entry.is_manual() {
                summary.manual += 1;
            } else {
                summary.automatic += 1;
            }
            if property.is_required {
                summary.required_mapped += 1;
            }
        }
        summary
    }

    pub fn is_complete(&self) -> bool {
        self.required_mapped == self.required_total
    }
}
