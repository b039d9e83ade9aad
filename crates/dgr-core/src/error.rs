//! # Validation Errors
//!
//! Field-level validation failures for the registry's domain primitives.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations. Each variant carries the offending value so callers
//! can report exactly what was rejected.

use thiserror::Error;

/// A domain value failed format or constraint validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// CIN is empty, too long, or contains non-alphanumeric characters.
    #[error("invalid CIN {0:?}: expected 1-20 ASCII alphanumeric characters")]
    InvalidCin(String),

    /// Sex code is not one of the fixed wire values.
    #[error("invalid sex code {0:?}: expected \"M\" or \"F\"")]
    InvalidSex(String),

    /// Timestamp string is malformed or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Document type code is not in the fixed value set.
    #[error("invalid document type {0:?}")]
    InvalidActType(String),

    /// A CIN is already registered to another client.
    #[error("CIN {0} is already registered")]
    DuplicateCin(String),

    /// Spouse assignment rejected by the sex-difference policy.
    #[error("spouses must differ in sex")]
    SpouseSexConflict,

    /// A client cannot be linked to themselves (spouse or child).
    #[error("a client cannot be linked to themselves")]
    SelfReference,

    /// A child already has two linked parents.
    #[error("client {0} already has two linked parents")]
    TooManyParents(String),
}
