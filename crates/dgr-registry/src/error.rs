//! # Registry Errors
//!
//! The caller-facing error taxonomy of the registry:
//!
//! - [`RegistryError::Validation`] — malformed or constraint-violating
//!   input to create/update. Propagated unmodified; no retry.
//! - [`RegistryError::Integrity`] — a uniqueness violation surfacing
//!   after field validation passes (derived-email collision, index
//!   desync). Surfaced to the caller; not retried.
//! - [`RegistryError::NotFound`] — a reference to a nonexistent client,
//!   account, or commune.
//!
//! Reset-code failures are *not* errors — they are explicit rejection
//! reasons ([`crate::account::ResetOutcome`]) returned as values.

use thiserror::Error;

use dgr_core::ValidationError;
use dgr_token::TokenError;

/// Top-level error type for registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Input failed field or constraint validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage-level uniqueness or internal-invariant violation.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Identity token could not be encoded for the record.
    #[error("token encoding failed: {0}")]
    Token(#[from] TokenError),
}

impl RegistryError {
    /// Shorthand for a [`RegistryError::NotFound`] with a formatted target.
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound(what.to_string())
    }
}
