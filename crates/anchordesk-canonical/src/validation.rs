use thiserror::Error;

/// Validation errors for canonical primitives.
///
/// Validation always runs before canonicalization; a payload that fails
/// here never reaches the digest engine, so no partial digest exists for
/// invalid input.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When a required field is missing or blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Field name that was empty.
        field: &'static str,
    },
}
