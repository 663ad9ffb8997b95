//! Required-field determination.

use crate::registry::FieldDescriptor;
use crate::settings::{RequiredPolicy, RequiredSettings};

/// Whether `field` of `data_type` is required under the configured policy.
///
/// With [`RequiredPolicy::Marker`] only the registry's `required` flag counts.
/// With [`RequiredPolicy::Legacy`] only the legacy name tables count; the
/// registry marker is ignored.
pub fn is_required(settings: &RequiredSettings, data_type: &str, field: &FieldDescriptor) -> bool {
    match settings.policy {
        RequiredPolicy::Marker => field.required,
        RequiredPolicy::Legacy => settings.legacy_requires(data_type, &field.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_policy_ignores_tables() {
        let settings = RequiredSettings::default();
        let id = FieldDescriptor::new("Id", "string");
        assert!(!is_required(&settings, "Bus", &id));
        assert!(is_required(&settings, "Bus", &id.clone().required()));
    }

    #[test]
    fn test_legacy_policy_uses_only_tables() {
        let mut settings = RequiredSettings {
            policy: RequiredPolicy::Legacy,
            ..RequiredSettings::default()
        };
        settings
            .per_type
            .insert("Line".to_string(), vec!["FromBus".to_string()]);

        assert!(is_required(&settings, "Bus", &FieldDescriptor::new("Id", "string")));
        assert!(is_required(&settings, "line", &FieldDescriptor::new("FromBus", "string")));
        assert!(!is_required(&settings, "Bus", &FieldDescriptor::new("FromBus", "string")));
        assert!(!is_required(
            &settings,
            "Bus",
            &FieldDescriptor::new("Zone", "string").required()
        ));
    }
}
