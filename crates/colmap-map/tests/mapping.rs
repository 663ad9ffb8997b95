//! Integration tests for the mapping document and auto-mapper.

use std::sync::Arc;

use colmap_catalog::{
    AutoMapSettings, FieldDescriptor, MappingSettings, SchemaCatalog, SchemaRegistry, TypeSchema,
};
use colmap_map::{
    AutoMapOutcome, AutoMapper, MappingDocument, OrphanedMappingDetector,
    RequiredMappingValidator, SourceColumns,
};
use colmap_model::ColumnInfo;
use proptest::prelude::*;
use tempfile::TempDir;

fn columns(table: &str, names: &[&str]) -> Vec<ColumnInfo> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| ColumnInfo::new(*name, i, table))
        .collect()
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,8}"
}

proptest! {
    #[test]
    fn update_then_remove_restores_prior_mappings(
        existing in prop::collection::vec((name_strategy(), name_strategy()), 0..8),
        property in name_strategy(),
        column in name_strategy(),
    ) {
        let mut doc = MappingDocument::new("prop");
        for (p, c) in &existing {
            doc.update_mapping("Bus", p, c).unwrap();
        }
        prop_assume!(doc.mapping_for("Bus", &property).is_none());
        let before = doc.mappings_for("Bus").to_vec();

        doc.update_mapping("Bus", &property, &column).unwrap();
        doc.remove_mapping("Bus", &property);

        prop_assert_eq!(doc.mappings_for("Bus").to_vec(), before);
    }

    #[test]
    fn each_property_maps_to_one_column(
        updates in prop::collection::vec((name_strategy(), name_strategy()), 0..16),
    ) {
        let mut doc = MappingDocument::new("prop");
        for (p, c) in &updates {
            doc.update_mapping("Line", p, c).unwrap();
        }
        let entries = doc.mappings_for("Line");
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                prop_assert!(!a.property_name.eq_ignore_ascii_case(&b.property_name));
            }
        }
    }
}

#[test]
fn auto_map_is_idempotent() {
    let catalog = SchemaCatalog::builtin().unwrap();
    let mapper = AutoMapper::default();
    let mut doc = MappingDocument::new("network");
    let table = columns(
        "Lines",
        &["Line ID", "From Bus", "To Bus", "R (pu)", "X (pu)", "Rating MVA", "Owner"],
    );

    let first = mapper.auto_map(&catalog, &mut doc, "Line", &table).unwrap();
    assert!(first.has_changes());
    let snapshot = doc.mappings().clone();

    let second = mapper.auto_map(&catalog, &mut doc, "Line", &table).unwrap();
    assert!(!second.has_changes());
    assert_eq!(doc.mappings(), &snapshot);
}

#[test]
fn auto_map_binds_obvious_columns() {
    let catalog = SchemaCatalog::builtin().unwrap();
    let mapper = AutoMapper::default();
    let mut doc = MappingDocument::new("network");
    let table = columns("Buses", &["Bus ID", "Name", "Nominal Voltage", "Zone"]);

    mapper.auto_map(&catalog, &mut doc, "bus", &table).unwrap();

    assert_eq!(doc.mapping_for("Bus", "Name").unwrap().column_header, "Name");
    assert_eq!(doc.mapping_for("Bus", "Zone").unwrap().confidence, Some(1.0));
    assert_eq!(
        doc.mapping_for("Bus", "NominalVoltage").unwrap().column_header,
        "Nominal Voltage"
    );
    assert_eq!(doc.mapping_for("Bus", "Id").unwrap().column_header, "Bus ID");
    assert!(RequiredMappingValidator::validate(&catalog, &doc).is_valid());
}

#[test]
fn single_name_column_is_bound_by_first_column_fallback() {
    let registry = SchemaRegistry::new(vec![
        TypeSchema::new("Area").field(FieldDescriptor::new("Code", "string").required()),
    ])
    .unwrap();
    let catalog = SchemaCatalog::new(Arc::new(registry), MappingSettings::default());
    let mapper = AutoMapper::new(AutoMapSettings::default());
    let mut doc = MappingDocument::new("areas");

    let report = mapper
        .auto_map(&catalog, &mut doc, "Area", &columns("areas", &["Name"]))
        .unwrap();

    assert_eq!(report.outcome, AutoMapOutcome::Completed { applied: 1 });
    let entry = doc.mapping_for("Area", "Code").unwrap();
    assert_eq!(entry.column_header, "Name");
    assert_eq!(entry.confidence, Some(1.0));
}

#[test]
fn manual_mapping_wins_over_auto_map() {
    let catalog = SchemaCatalog::builtin().unwrap();
    let mapper = AutoMapper::default();
    let mut doc = MappingDocument::new("network");
    doc.update_mapping("Load", "Bus", "Node").unwrap();

    mapper
        .auto_map(&catalog, &mut doc, "Load", &columns("loads", &["Node", "Bus", "P"]))
        .unwrap();

    let entry = doc.mapping_for("Load", "Bus").unwrap();
    assert_eq!(entry.column_header, "Node");
    assert!(entry.is_manual());
}

#[test]
fn zero_columns_leaves_document_clean() {
    let catalog = SchemaCatalog::builtin().unwrap();
    let mut doc = MappingDocument::new("network");
    let report = AutoMapper::default()
        .auto_map(&catalog, &mut doc, "Bus", &[])
        .unwrap();
    assert_eq!(report.outcome, AutoMapOutcome::NoSourceColumns);
    assert!(!doc.is_dirty());
}

#[test]
fn orphan_detection_uses_recorded_columns_after_file_is_gone() {
    let dir = TempDir::new().unwrap();
    let buses = dir.path().join("buses.csv");
    std::fs::write(&buses, "Bus ID,Zone\n1,North\n").unwrap();

    let mut sources = SourceColumns::new();
    let refs = sources.register_file(&buses).unwrap();
    let mut doc = MappingDocument::new("network");
    doc.add_referenced_file(&buses);
    doc.set_table_reference("Bus", &refs[0].display_name()).unwrap();
    doc.update_mapping("Bus", "Zone", "Zone").unwrap();

    std::fs::remove_file(&buses).unwrap();

    let report = OrphanedMappingDetector::detect(&doc, &sources, &buses);
    assert_eq!(report.orphaned.len(), 1);
    assert_eq!(report.stale_table_references.len(), 1);
}
