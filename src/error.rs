//! Error types for Pulsefit
//!
//! The aggregation core is total over well-typed inputs and never returns these.
//! They surface at the edges: row ingestion, configuration and output encoding.

use thiserror::Error;

/// Errors raised at the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid row: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate record for date {0}")]
    DuplicateDate(String),

    #[error("Rows for users '{first}' and '{second}' in one batch")]
    MixedUsers { first: String, second: String },

    #[error("Invalid score weights: {0}")]
    InvalidWeights(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// Failures found while validating raw daily rows, alone or as a batch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Malformed date '{0}', expected YYYY-MM-DD")]
    MalformedDate(String),

    #[error("Field {field} must be a finite non-negative number, got {value}")]
    NegativeOrNonFinite { field: &'static str, value: f64 },

    #[error("Date {0} already appears in an earlier row")]
    DuplicateDate(String),

    #[error("Row belongs to user '{found}', batch belongs to '{expected}'")]
    MixedUser { expected: String, found: String },
}
