//! Required-field validation.

use std::collections::BTreeSet;

use colmap_catalog::{SchemaCatalog, SettingsProvider};

use crate::document::MappingDocument;

/// Required-field status of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeValidation {
    pub data_type: String,
    pub required: Vec<String>,
    /// Required fields without a mapping.
    pub missing: Vec<String>,
}

impl TypeValidation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Result of validating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub types: Vec<TypeValidation>,
}

impl ValidationReport {
    /// Valid iff no checked type has unmapped required fields.
    pub fn is_valid(&self) -> bool {
        self.types.iter().all(TypeValidation::is_valid)
    }

    pub fn invalid_types(&self) -> impl Iterator<Item = &TypeValidation> {
        self.types.iter().filter(|t| !t.is_valid())
    }

    pub fn missing_count(&self) -> usize {
        self.types.iter().map(|t| t.missing.len()).sum()
    }
}

/// Diffs each type's required fields against its mapped fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredMappingValidator;

impl RequiredMappingValidator {
    /// Validates the types the document is working on: those with mappings
    /// or a selected source table.
    pub fn validate<S: SettingsProvider>(
        catalog: &SchemaCatalog<S>,
        document: &MappingDocument,
    ) -> ValidationReport {
        let mut seen = BTreeSet::new();
        let active: Vec<String> = document
            .mapped_types()
            .chain(document.table_references().keys().map(String::as_str))
            .map(|t| catalog.canonical_name(t).unwrap_or(t).to_string())
            .filter(|t| seen.insert(t.to_lowercase()))
            .collect();
        Self::validate_types(catalog, document, &active)
    }

    /// Validates an explicit list of types.
    pub fn validate_types<S, T>(
        catalog: &SchemaCatalog<S>,
        document: &MappingDocument,
        data_types: &[T],
    ) -> ValidationReport
    where
        S: SettingsProvider,
        T: AsRef<str>,
    {
        let types = data_types
            .iter()
            .map(|data_type| {
                let data_type = data_type.as_ref();
                let required = catalog.required_properties(data_type);
                let missing = required
                    .iter()
                    .filter(|p| document.mapping_for(data_type, p).is_none())
                    .cloned()
                    .collect();
                TypeValidation {
                    data_type: data_type.to_string(),
                    required,
                    missing,
                }
            })
            .collect();
        let report = ValidationReport { types };
        tracing::debug!(
            types = report.types.len(),
            missing = report.missing_count(),
            "Validated required mappings"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_missing_required_fields() {
        let catalog = SchemaCatalog::builtin().unwrap();
        let mut doc = MappingDocument::new("network");
        doc.update_mapping("Line", "Id", "LineId").unwrap();
        doc.update_mapping("Line", "FromBus", "From").unwrap();

        let report = RequiredMappingValidator::validate(&catalog, &doc);
        assert!(!report.is_valid());
        assert_eq!(report.types.len(), 1);
        assert_eq!(report.types[0].missing, vec!["ToBus"]);

        doc.update_mapping("Line", "ToBus", "To").unwrap();
        assert!(RequiredMappingValidator::validate(&catalog, &doc).is_valid());
    }

    #[test]
    fn test_table_reference_makes_type_active() {
        let catalog = SchemaCatalog::builtin().unwrap();
        let mut doc = MappingDocument::new("network");
        doc.set_table_reference("bus", "network.xlsx | Buses").unwrap();

        let report = RequiredMappingValidator::validate(&catalog, &doc);
        assert_eq!(report.types[0].data_type, "Bus");
        assert_eq!(report.types[0].missing, vec!["Id", "NominalVoltage"]);
    }

    #[test]
    fn test_empty_document_is_valid() {
        let catalog = SchemaCatalog::builtin().unwrap();
        let report = RequiredMappingValidator::validate(&catalog, &MappingDocument::new("x"));
        assert!(report.is_valid());
        assert_eq!(report.missing_count(), 0);
    }
}
