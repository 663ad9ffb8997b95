//! Automatic field-to-column mapping.
//!
//! For one target type and the columns of its selected table, the auto-mapper
//! scores each unmapped field against the unmapped columns and binds the
//! first ranked candidate that clears its threshold. Fields are processed in
//! alphabetical order and each bound column is consumed, so results are
//! deterministic for a fixed field and column set.
//!
//! Identifier-like fields (required, named `Id`, or named after the type)
//! get two extra rules:
//!
//! - A column whose name contains a descriptor keyword (`style`, `type`, ...)
//!   must clear the higher guarded threshold.
//! - After the fuzzy pass, the type's primary identifier may be bound by the
//!   configured [`IdentifierFallback`].

use std::fmt;

use colmap_catalog::{AutoMapSettings, IdentifierFallback, SchemaCatalog, SettingsProvider};
use colmap_model::{ColumnInfo, MappingEntry, PropertyInfo};

use crate::document::MappingDocument;
use crate::error::{Result, require_name};
use crate::score::{FuzzyMatch, FuzzyMatcher, JaroWinklerMatcher, MatchReason, rank_matches};

/// Confidence of a first-column identifier binding.
const FIRST_COLUMN_CONFIDENCE: f64 = 1.0;
/// Confidence of an allow-list identifier binding.
const ALLOW_LIST_CONFIDENCE: f64 = 0.95;

// =============================================================================
// REPORT
// =============================================================================

/// Overall result of an auto-map run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMapOutcome {
    /// The table has no columns; nothing was attempted.
    NoSourceColumns,
    /// Every visible field already has a mapping.
    AllFieldsMapped,
    /// Fields were evaluated; `applied` mappings were created.
    Completed { applied: usize },
}

/// What happened to one unmapped field in the fuzzy pass.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDecision {
    Matched {
        column: String,
        score: f64,
        reason: MatchReason,
    },
    /// Best candidate scored below its threshold but above the report floor.
    LowConfidence {
        column: String,
        score: f64,
        threshold: f64,
    },
    NoMatch,
}

/// How the identifier fallback picked its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackRule {
    FirstColumn,
    AllowList,
}

impl fmt::Display for FallbackRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstColumn => write!(f, "first remaining column"),
            Self::AllowList => write!(f, "identifier name allow-list"),
        }
    }
}

/// An identifier bound by the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackBinding {
    pub property_name: String,
    pub column: String,
    pub confidence: f64,
    pub rule: FallbackRule,
}

/// Full account of an auto-map run.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoMapReport {
    pub data_type: String,
    pub outcome: AutoMapOutcome,
    /// Fuzzy-pass decision per unmapped field, in processing order.
    pub decisions: Vec<(String, FieldDecision)>,
    pub fallback: Option<FallbackBinding>,
    /// Mappings created (or to be created) by this run.
    pub applied: Vec<MappingEntry>,
}

impl AutoMapReport {
    fn new(data_type: &str, outcome: AutoMapOutcome) -> Self {
        Self {
            data_type: data_type.to_string(),
            outcome,
            decisions: Vec::new(),
            fallback: None,
            applied: Vec::new(),
        }
    }

    pub fn decision_for(&self, property: &str) -> Option<&FieldDecision> {
        self.decisions
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(property))
            .map(|(_, decision)| decision)
    }

    /// Fields whose best candidate was reported but not bound.
    pub fn low_confidence(&self) -> impl Iterator<Item = (&str, &FieldDecision)> {
        self.decisions
            .iter()
            .filter(|(_, d)| matches!(d, FieldDecision::LowConfidence { .. }))
            .map(|(name, d)| (name.as_str(), d))
    }

    pub fn has_changes(&self) -> bool {
        !self.applied.is_empty()
    }
}

// =============================================================================
// AUTO-MAPPER
// =============================================================================

/// Proposes and applies mappings for one type at a time.
#[derive(Debug, Clone)]
pub struct AutoMapper<M = JaroWinklerMatcher> {
    matcher: M,
    settings: AutoMapSettings,
}

impl AutoMapper {
    pub fn new(settings: AutoMapSettings) -> Self {
        Self::with_matcher(JaroWinklerMatcher, settings)
    }
}

impl Default for AutoMapper {
    fn default() -> Self {
        Self::new(AutoMapSettings::default())
    }
}

impl<M: FuzzyMatcher> AutoMapper<M> {
    pub fn with_matcher(matcher: M, settings: AutoMapSettings) -> Self {
        Self { matcher, settings }
    }

    pub fn settings(&self) -> &AutoMapSettings {
        &self.settings
    }

    /// Maps the visible fields of `data_type` onto `columns` and applies
    /// every accepted binding to the document.
    pub fn auto_map<S: SettingsProvider>(
        &self,
        catalog: &SchemaCatalog<S>,
        document: &mut MappingDocument,
        data_type: &str,
        columns: &[ColumnInfo],
    ) -> Result<AutoMapReport> {
        let data_type = require_name("data type", data_type)?;
        let data_type = catalog.canonical_name(data_type).unwrap_or(data_type);
        let properties = catalog.get_properties_for_type(data_type);
        let plural = catalog.plural_name(data_type);

        let report = self.plan(
            data_type,
            plural.as_deref(),
            &properties,
            document.mappings_for(data_type),
            columns,
        );

        for entry in &report.applied {
            document.update_auto_mapping(
                data_type,
                &entry.property_name,
                &entry.column_header,
                entry.confidence.unwrap_or(1.0),
            )?;
        }

        tracing::info!(
            data_type,
            applied = report.applied.len(),
            low_confidence = report.low_confidence().count(),
            outcome = ?report.outcome,
            "Auto-map finished"
        );
        Ok(report)
    }

    /// Computes the bindings for one type without touching any document.
    ///
    /// `existing` are the type's current mappings; their fields and columns
    /// are left alone.
    pub fn plan(
        &self,
        data_type: &str,
        plural: Option<&str>,
        properties: &[PropertyInfo],
        existing: &[MappingEntry],
        columns: &[ColumnInfo],
    ) -> AutoMapReport {
        if columns.is_empty() {
            return AutoMapReport::new(data_type, AutoMapOutcome::NoSourceColumns);
        }

        let is_mapped = |name: &str| {
            existing
                .iter()
                .any(|e| e.property_name.eq_ignore_ascii_case(name))
        };
        let mut unmapped_fields: Vec<&PropertyInfo> = properties
            .iter()
            .filter(|p| !is_mapped(&p.property_name))
            .collect();
        if unmapped_fields.is_empty() {
            return AutoMapReport::new(data_type, AutoMapOutcome::AllFieldsMapped);
        }
        unmapped_fields.sort_by(|a, b| {
            a.property_name
                .to_lowercase()
                .cmp(&b.property_name.to_lowercase())
                .then_with(|| a.property_name.cmp(&b.property_name))
        });

        let ordered_columns = columns_by_index(columns);
        let mut remaining: Vec<&ColumnInfo> = ordered_columns
            .iter()
            .copied()
            .filter(|c| !existing.iter().any(|e| c.is_named(&e.column_header)))
            .collect();

        let mut report = AutoMapReport::new(data_type, AutoMapOutcome::Completed { applied: 0 });
        for property in unmapped_fields {
            let decision = self.match_field(data_type, plural, property, &remaining);
            tracing::debug!(
                data_type,
                property = %property.property_name,
                decision = ?decision,
                "Auto-map decision"
            );
            if let FieldDecision::Matched { column, score, .. } = &decision {
                remaining.retain(|c| !c.is_named(column));
                report.applied.push(MappingEntry::automatic(
                    &property.property_name,
                    column,
                    *score as f32,
                ));
            }
            report
                .decisions
                .push((property.property_name.clone(), decision));
        }

        if let Some(primary) = primary_identifier(data_type, plural, properties) {
            let bound = is_mapped(&primary.property_name)
                || report
                    .applied
                    .iter()
                    .any(|e| e.property_name.eq_ignore_ascii_case(&primary.property_name));
            if !bound {
                report.fallback = self.identifier_fallback(primary, &remaining, &ordered_columns);
            }
        }
        if let Some(binding) = &report.fallback {
            tracing::debug!(
                data_type,
                property = %binding.property_name,
                column = %binding.column,
                rule = %binding.rule,
                "Identifier fallback"
            );
            report.applied.push(MappingEntry::automatic(
                &binding.property_name,
                &binding.column,
                binding.confidence as f32,
            ));
        }

        report.outcome = AutoMapOutcome::Completed {
            applied: report.applied.len(),
        };
        report
    }

    fn match_field(
        &self,
        data_type: &str,
        plural: Option<&str>,
        property: &PropertyInfo,
        remaining: &[&ColumnInfo],
    ) -> FieldDecision {
        if remaining.is_empty() {
            return FieldDecision::NoMatch;
        }
        let names: Vec<String> = remaining.iter().map(|c| c.column_name.clone()).collect();
        let floor = self.settings.report_floor.min(self.settings.threshold);

        let mut ranked = self
            .matcher
            .find_matches(&property.property_name, &names, floor, false);
        if let Some(description) = property.description_text() {
            for candidate in self.matcher.find_matches(description, &names, floor, false) {
                merge_best(&mut ranked, candidate);
            }
        }
        rank_matches(&mut ranked);

        let identifier_like = is_identifier_like(property, data_type, plural);
        if let Some(accepted) = ranked
            .iter()
            .find(|m| m.score >= self.threshold_for(identifier_like, &m.candidate))
        {
            return FieldDecision::Matched {
                column: accepted.candidate.clone(),
                score: accepted.score,
                reason: accepted.reason.clone(),
            };
        }

        match ranked.first() {
            Some(top) if top.score >= self.settings.report_floor => FieldDecision::LowConfidence {
                column: top.candidate.clone(),
                score: top.score,
                threshold: self.threshold_for(identifier_like, &top.candidate),
            },
            _ => FieldDecision::NoMatch,
        }
    }

    /// Acceptance threshold for pairing a field with a column.
    pub fn threshold_for(&self, identifier_like: bool, column: &str) -> f64 {
        if identifier_like && self.is_descriptor_column(column) {
            self.settings.guarded_threshold
        } else {
            self.settings.threshold
        }
    }

    /// Whether the column name contains a generic descriptor keyword.
    pub fn is_descriptor_column(&self, column: &str) -> bool {
        let column = column.to_lowercase();
        self.settings
            .generic_keywords
            .iter()
            .any(|k| !k.is_empty() && column.contains(&k.to_lowercase()))
    }

    fn identifier_fallback(
        &self,
        property: &PropertyInfo,
        remaining: &[&ColumnInfo],
        all_columns: &[&ColumnInfo],
    ) -> Option<FallbackBinding> {
        let binding = |column: &ColumnInfo, confidence, rule| FallbackBinding {
            property_name: property.property_name.clone(),
            column: column.column_name.clone(),
            confidence,
            rule,
        };

        match self.settings.identifier_fallback {
            IdentifierFallback::Disabled => None,
            IdentifierFallback::FirstColumn => remaining
                .iter()
                .copied()
                .find(|c| !self.is_descriptor_column(&c.column_name))
                .map(|c| binding(c, FIRST_COLUMN_CONFIDENCE, FallbackRule::FirstColumn))
                .or_else(|| {
                    self.allow_listed(all_columns)
                        .map(|c| binding(c, ALLOW_LIST_CONFIDENCE, FallbackRule::AllowList))
                }),
            IdentifierFallback::AllowListOnly => self
                .allow_listed(all_columns)
                .map(|c| binding(c, ALLOW_LIST_CONFIDENCE, FallbackRule::AllowList)),
        }
    }

    fn allow_listed<'c>(&self, columns: &[&'c ColumnInfo]) -> Option<&'c ColumnInfo> {
        columns.iter().copied().find(|c| {
            self.settings
                .identifier_names
                .iter()
                .any(|name| c.is_named(name))
        })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Columns sorted by index, keeping the first of any duplicate names.
fn columns_by_index(columns: &[ColumnInfo]) -> Vec<&ColumnInfo> {
    let mut ordered: Vec<&ColumnInfo> = columns.iter().collect();
    ordered.sort_by_key(|c| c.column_index);
    let mut unique: Vec<&ColumnInfo> = Vec::with_capacity(ordered.len());
    for column in ordered {
        if !unique.iter().any(|u| u.is_named(&column.column_name)) {
            unique.push(column);
        }
    }
    unique
}

/// Keeps the higher score per candidate.
fn merge_best(ranked: &mut Vec<FuzzyMatch>, candidate: FuzzyMatch) {
    match ranked.iter_mut().find(|m| m.index == candidate.index) {
        Some(existing) if existing.score < candidate.score => *existing = candidate,
        Some(_) => {}
        None => ranked.push(candidate),
    }
}

/// Required, named `Id`, or named after the type (singular or plural).
pub fn is_identifier_like(property: &PropertyInfo, data_type: &str, plural: Option<&str>) -> bool {
    let name = property.property_name.as_str();
    property.is_required
        || name.eq_ignore_ascii_case("Id")
        || name.eq_ignore_ascii_case(data_type)
        || plural.is_some_and(|p| name.eq_ignore_ascii_case(p))
}

/// The one field the identifier fallback may bind.
///
/// Preference: a field named `Id`, then one named after the type, then the
/// alphabetically first required field.
pub fn primary_identifier<'p>(
    data_type: &str,
    plural: Option<&str>,
    properties: &'p [PropertyInfo],
) -> Option<&'p PropertyInfo> {
    let rank = |p: &PropertyInfo| {
        let name = p.property_name.as_str();
        if name.eq_ignore_ascii_case("Id") {
            Some(0)
        } else if name.eq_ignore_ascii_case(data_type)
            || plural.is_some_and(|pl| name.eq_ignore_ascii_case(pl))
        {
            Some(1)
        } else if p.is_required {
            Some(2)
        } else {
            None
        }
    };
    properties
        .iter()
        .filter_map(|p| rank(p).map(|r| (r, p.property_name.to_lowercase(), p)))
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, _, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Matcher returning fixed scores per (query, candidate).
    struct StubMatcher(Vec<(&'static str, &'static str, f64)>);

    impl FuzzyMatcher for StubMatcher {
        fn find_matches(
            &self,
            query: &str,
            candidates: &[String],
            min_score: f64,
            _case_sensitive: bool,
        ) -> Vec<FuzzyMatch> {
            let mut matches: Vec<FuzzyMatch> = candidates
                .iter()
                .enumerate()
                .filter_map(|(index, candidate)| {
                    self.0
                        .iter()
                        .find(|(q, c, _)| *q == query && c == candidate)
                        .filter(|(_, _, score)| *score >= min_score)
                        .map(|(_, _, score)| FuzzyMatch {
                            candidate: candidate.clone(),
                            index,
                            score: *score,
                            reason: MatchReason::Similarity,
                        })
                })
                .collect();
            rank_matches(&mut matches);
            matches
        }
    }

    fn columns(table: &str, names: &[&str]) -> Vec<ColumnInfo> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| ColumnInfo::new(*name, i, table))
            .collect()
    }

    #[test]
    fn test_guard_rejects_descriptor_column_then_falls_back() {
        let mapper = AutoMapper::with_matcher(
            StubMatcher(vec![("Bus", "BusStyle", 0.7), ("Bus", "BusId", 0.55)]),
            AutoMapSettings::default(),
        );
        let properties = vec![PropertyInfo::new("Bus", "string").required()];
        let columns = columns("loads", &["BusStyle", "BusId"]);

        let report = mapper.plan("Load", None, &properties, &[], &columns);

        assert_eq!(
            report.decision_for("Bus"),
            Some(&FieldDecision::LowConfidence {
                column: "BusStyle".to_string(),
                score: 0.7,
                threshold: 0.85,
            })
        );
        let fallback = report.fallback.as_ref().expect("fallback attempted");
        assert_eq!(fallback.column, "BusId");
        assert_eq!(fallback.rule, FallbackRule::FirstColumn);
        assert!(report.applied.iter().all(|e| e.column_header != "BusStyle"));
    }

    #[test]
    fn test_guard_only_applies_to_identifier_like_fields() {
        let mapper = AutoMapper::with_matcher(
            StubMatcher(vec![("Category", "BusStyle", 0.7)]),
            AutoMapSettings::default(),
        );
        let properties = vec![PropertyInfo::new("Category", "string")];
        let columns = columns("buses", &["BusStyle"]);

        let report = mapper.plan("Bus", Some("Buses"), &properties, &[], &columns);
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].confidence, Some(0.7));
    }

    #[test]
    fn test_zero_columns_is_distinct_outcome() {
        let mapper = AutoMapper::default();
        let properties = vec![PropertyInfo::new("Id", "string").required()];
        let report = mapper.plan("Bus", None, &properties, &[], &[]);
        assert_eq!(report.outcome, AutoMapOutcome::NoSourceColumns);

        let existing = vec![MappingEntry::manual("Id", "ID")];
        let report = mapper.plan("Bus", None, &properties, &existing, &columns("b", &["ID"]));
        assert_eq!(report.outcome, AutoMapOutcome::AllFieldsMapped);
    }

    #[test]
    fn test_single_name_column_binds_required_field() {
        let mapper = AutoMapper::default();
        let properties = vec![PropertyInfo::new("Code", "string").required()];
        let report = mapper.plan("Substation", None, &properties, &[], &columns("s", &["Name"]));

        assert_eq!(report.applied, vec![MappingEntry::automatic("Code", "Name", 1.0)]);
        assert_eq!(report.outcome, AutoMapOutcome::Completed { applied: 1 });
    }

    #[test]
    fn test_allow_list_when_no_columns_remain() {
        let mapper = AutoMapper::default();
        let properties = vec![
            PropertyInfo::new("Id", "string").required(),
            PropertyInfo::new("Name", "string"),
        ];
        let existing = vec![MappingEntry::manual("Name", "Identifier")];
        let report = mapper.plan(
            "Bus",
            None,
            &properties,
            &existing,
            &columns("b", &["Identifier"]),
        );

        let fallback = report.fallback.expect("allow-list fallback");
        assert_eq!(fallback.rule, FallbackRule::AllowList);
        assert_eq!(fallback.column, "Identifier");
        assert_eq!(fallback.confidence, ALLOW_LIST_CONFIDENCE);
    }

    #[test]
    fn test_disabled_fallback_binds_nothing() {
        let settings = AutoMapSettings {
            identifier_fallback: IdentifierFallback::Disabled,
            ..AutoMapSettings::default()
        };
        let mapper = AutoMapper::new(settings);
        let properties = vec![PropertyInfo::new("Code", "string").required()];
        let report = mapper.plan("Substation", None, &properties, &[], &columns("s", &["Name"]));
        assert!(report.applied.is_empty());
        assert_eq!(report.decision_for("Code"), Some(&FieldDecision::NoMatch));
    }

    #[test]
    fn test_description_can_win() {
        let mapper = AutoMapper::with_matcher(
            StubMatcher(vec![
                ("Zone", "Region", 0.3),
                ("Area or zone", "Region", 0.8),
            ]),
            AutoMapSettings::default(),
        );
        let properties = vec![PropertyInfo::new("Zone", "string").with_description("Area or zone")];
        let report = mapper.plan("Bus", None, &properties, &[], &columns("b", &["Region"]));
        assert_eq!(report.applied[0].column_header, "Region");
        assert_eq!(report.applied[0].confidence, Some(0.8));
    }

    #[test]
    fn test_columns_are_consumed_in_field_order() {
        let mapper = AutoMapper::with_matcher(
            StubMatcher(vec![("Alpha", "Shared", 0.7), ("Beta", "Shared", 0.9)]),
            AutoMapSettings {
                identifier_fallback: IdentifierFallback::Disabled,
                ..AutoMapSettings::default()
            },
        );
        let properties = vec![
            PropertyInfo::new("Beta", "string"),
            PropertyInfo::new("Alpha", "string"),
        ];
        let report = mapper.plan("T", None, &properties, &[], &columns("t", &["Shared"]));
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.applied[0].property_name, "Alpha");
        assert_eq!(report.decision_for("Beta"), Some(&FieldDecision::NoMatch));
    }

    #[test]
    fn test_primary_identifier_priority() {
        let properties = vec![
            PropertyInfo::new("FromBus", "string").required(),
            PropertyInfo::new("Line", "string"),
            PropertyInfo::new("Id", "string"),
        ];
        assert_eq!(
            primary_identifier("Line", None, &properties).map(|p| p.property_name.as_str()),
            Some("Id")
        );
        assert_eq!(
            primary_identifier("Line", None, &properties[..2]).map(|p| p.property_name.as_str()),
            Some("Line")
        );
        assert_eq!(
            primary_identifier("Line", None, &properties[..1]).map(|p| p.property_name.as_str()),
            Some("FromBus")
        );
    }
}
