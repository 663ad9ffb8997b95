//! Integration tests for the schema catalog.

use std::sync::Arc;

use colmap_catalog::{
    FieldDescriptor, MappingSettings, SchemaCatalog, SchemaRegistry, TypeSchema,
};
use colmap_model::Visibility;
use proptest::prelude::*;
use tempfile::TempDir;

fn field_strategy() -> impl Strategy<Value = (bool, bool, bool)> {
    (any::<bool>(), any::<bool>(), any::<bool>())
}

fn registry_from_flags(flags: &[(bool, bool, bool)]) -> SchemaRegistry {
    let schema = flags.iter().enumerate().fold(
        TypeSchema::new("Bus"),
        |schema, (i, &(required, computed, hidden))| {
            let mut field = FieldDescriptor::new(format!("Field{i}"), "string");
            field.required = required;
            field.computed = computed;
            field.hidden = hidden;
            schema.field(field)
        },
    );
    SchemaRegistry::new(vec![schema]).expect("valid registry")
}

proptest! {
    #[test]
    fn visible_properties_are_a_subset_of_all(
        flags in prop::collection::vec(field_strategy(), 0..12),
        listed in prop::collection::vec(0usize..12, 0..6),
    ) {
        let registry = Arc::new(registry_from_flags(&flags));
        let mut settings = MappingSettings::default();
        settings.set_visibility(
            "Bus",
            Visibility::subset(listed.iter().map(|i| format!("Field{i}"))),
        );
        let catalog = SchemaCatalog::new(registry, settings);

        let all = catalog.get_all_properties_for_type("Bus");
        for property in catalog.get_properties_for_type("Bus") {
            prop_assert!(all.contains(&property));
        }
    }

    #[test]
    fn wildcard_visibility_equals_all(
        flags in prop::collection::vec(field_strategy(), 0..12),
    ) {
        let registry = Arc::new(registry_from_flags(&flags));
        let mut settings = MappingSettings::default();
        settings.set_visibility("Bus", Visibility::All);
        let catalog = SchemaCatalog::new(registry, settings);

        prop_assert_eq!(
            catalog.get_properties_for_type("Bus"),
            catalog.get_all_properties_for_type("Bus")
        );
    }
}

#[test]
fn registry_file_and_settings_file_work_together() {
    let dir = TempDir::new().unwrap();
    let registry_path = dir.path().join("registry.toml");
    std::fs::write(
        &registry_path,
        r#"
        [[types]]
        name = "Substation"
        description = "Group of buses at one site"

        [[types.fields]]
        name = "Code"
        required = true

        [[types.fields]]
        name = "Owner"
        hidden = true
        "#,
    )
    .unwrap();

    let settings_path = dir.path().join("settings.toml");
    std::fs::write(
        &settings_path,
        r#"
        [types.Substation]
        fields = ["Code", "Owner"]
        "#,
    )
    .unwrap();

    let registry = SchemaRegistry::load(&registry_path).expect("load registry");
    let settings = MappingSettings::load_from(&settings_path);
    let catalog = SchemaCatalog::new(Arc::new(registry), settings);

    assert_eq!(catalog.available_data_types(), vec!["Substation"]);
    assert_eq!(
        catalog.get_data_type_description("substation").as_deref(),
        Some("Group of buses at one site")
    );
    let visible: Vec<_> = catalog
        .get_properties_for_type("Substation")
        .into_iter()
        .map(|p| p.property_name)
        .collect();
    assert_eq!(visible, vec!["Code", "Owner"]);
    assert_eq!(catalog.required_properties("Substation"), vec!["Code"]);
}

#[test]
fn missing_settings_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = MappingSettings::load_from(&dir.path().join("absent.toml"));
    assert_eq!(settings, MappingSettings::default());
}
