//! Mapping state and mapping assistance.
//!
//! - [`MappingDocument`]: referenced files, field-to-column mappings per
//!   target type, selected source table per type, dirty tracking
//! - [`AutoMapper`]: fuzzy best-guess mapping with an identifier guard and a
//!   configurable identifier fallback
//! - [`RequiredMappingValidator`], [`InvalidMappingDetector`],
//!   [`OrphanedMappingDetector`]: report-first consistency checks
//! - [`SourceColumns`]: recorded columns of registered files

mod audit;
mod automap;
mod document;
mod error;
mod score;
mod sources;
mod status;
mod summary;
mod tracker;
mod validate;

// === Error Types ===
pub use error::{MappingError, Result};

// === Document ===
pub use document::{MapMetadata, MappingDocument};
pub use tracker::DirtyTracker;

// === Scoring ===
pub use score::{FuzzyMatch, FuzzyMatcher, JaroWinklerMatcher, MatchReason, rank_matches, tokenize};

// === Auto-map ===
pub use automap::{
    AutoMapOutcome, AutoMapReport, AutoMapper, FallbackBinding, FallbackRule, FieldDecision,
    is_identifier_like, primary_identifier,
};

// === Validation & Audits ===
pub use audit::{
    InvalidMapping, InvalidMappingDetector, InvalidReason, OrphanReport, OrphanedMapping,
    OrphanedMappingDetector,
};
pub use validate::{RequiredMappingValidator, TypeValidation, ValidationReport};

// === Sources & Status ===
pub use sources::SourceColumns;
pub use status::{
    apply_file_statuses, check_file_statuses, check_file_statuses_async, refresh_file_statuses,
};
pub use summary::{ConfidenceLevel, ConfidenceThresholds, MappingSummary};
