//! # Person Primitives
//!
//! The registered sex of a citizen record, with fixed single-letter wire
//! codes carried over from the persisted column values.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Registered sex of a client.
///
/// The wire codes `"M"` and `"F"` are a persistence compatibility
/// contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    /// Masculin.
    #[serde(rename = "M")]
    Male,
    /// Féminin.
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Returns the single-letter wire code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    /// Parse a wire code.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSex`] for anything other than
    /// `"M"` or `"F"`.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        match code {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            other => Err(ValidationError::InvalidSex(other.to_string())),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
