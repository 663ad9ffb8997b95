//! Error types for mapping operations.

use thiserror::Error;

/// Errors from mapping document and auto-map operations.
///
/// Validation findings (unmapped required fields, invalid or orphaned
/// mappings) are reports, not errors.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A caller-supplied argument is empty or out of range.
    #[error("invalid {argument}: {reason}")]
    ArgumentInvalid {
        argument: &'static str,
        reason: String,
    },

    /// Reading a source file for the column snapshot failed.
    #[error(transparent)]
    Ingest(#[from] colmap_ingest::IngestError),

    /// A background task was cancelled or panicked.
    #[error("background task failed: {message}")]
    Task { message: String },
}

impl MappingError {
    pub(crate) fn empty(argument: &'static str) -> Self {
        Self::ArgumentInvalid {
            argument,
            reason: "must not be empty".to_string(),
        }
    }
}

/// Rejects blank names, returning the trimmed value.
pub(crate) fn require_name<'a>(argument: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(MappingError::empty(argument))
    } else {
        Ok(trimmed)
    }
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;
