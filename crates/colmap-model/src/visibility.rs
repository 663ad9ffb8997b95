use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Wildcard used in settings to enable every field of a type.
pub const WILDCARD: &str = "*";

/// Which fields of a target type are visible for mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VisibilityRepr", into = "VisibilityRepr")]
pub enum Visibility {
    /// Every field is visible (`"*"` in settings).
    All,
    /// Only the named fields are visible.
    Subset(BTreeSet<String>),
}

impl Visibility {
    pub fn subset<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.contains(WILDCARD) {
            Self::All
        } else {
            Self::Subset(names)
        }
    }

    /// Field names compare case-insensitively.
    pub fn allows(&self, field: &str) -> bool {
        match self {
            Self::All => true,
            Self::Subset(names) => names.iter().any(|n| n.eq_ignore_ascii_case(field)),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Settings-file shape: either `"*"` or a list of field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum VisibilityRepr {
    Wildcard(String),
    List(Vec<String>),
}

impl From<VisibilityRepr> for Visibility {
    fn from(repr: VisibilityRepr) -> Self {
        match repr {
            VisibilityRepr::Wildcard(value) if value.trim() == WILDCARD => Self::All,
            VisibilityRepr::Wildcard(value) => Self::subset(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            ),
            VisibilityRepr::List(names) => Self::subset(names),
        }
    }
}

impl From<Visibility> for VisibilityRepr {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::All => Self::Wildcard(WILDCARD.to_string()),
            Visibility::Subset(names) => Self::List(names.into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_parses_to_all() {
        let visibility: Visibility = serde_json::from_str(r#""*""#).unwrap();
        assert!(visibility.is_all());
        assert!(visibility.allows("anything"));
    }

    #[test]
    fn list_parses_to_subset() {
        let visibility: Visibility = serde_json::from_str(r#"["Name","Voltage"]"#).unwrap();
        assert!(visibility.allows("name"));
        assert!(!visibility.allows("Id"));
    }

    #[test]
    fn list_containing_wildcard_is_all() {
        assert!(Visibility::subset(["Name", "*"]).is_all());
    }

    #[test]
    fn comma_separated_string_is_subset() {
        let visibility: Visibility = serde_json::from_str(r#""Name, Voltage""#).unwrap();
        assert_eq!(
            visibility,
            Visibility::Subset(["Name".to_string(), "Voltage".to_string()].into())
        );
    }
}
