//! # Token Payload — Canonical JCS Serialization
//!
//! The typed payload embedded in an identity token, and its canonical
//! byte production. All serialization flows through
//! [`TokenPayload::canonical_json`], which uses `serde_jcs` for RFC 8785
//! (JSON Canonicalization Scheme) output: sorted keys, compact
//! separators, deterministic byte sequence.
//!
//! The wire keys are a persistence compatibility contract: existing
//! scanners parse `nom`, `prenom`, `date_naissance`, `lieu_naissance`.
//! `lieu_naissance` is JSON `null` when the birthplace is unrecorded, and
//! `date_naissance` is ISO `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Snapshot of the client fields embedded in an identity token.
///
/// Spouse and children are intentionally absent — the registry tracks
/// them, the token does not carry them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Date of birth, serialized as `YYYY-MM-DD`.
    pub date_naissance: NaiveDate,
    /// Name of the birthplace commune, or `null` when unrecorded.
    pub lieu_naissance: Option<String>,
}

impl TokenPayload {
    /// Build a payload from its parts.
    pub fn new(
        nom: impl Into<String>,
        prenom: impl Into<String>,
        date_naissance: NaiveDate,
        lieu_naissance: Option<String>,
    ) -> Self {
        Self {
            nom: nom.into(),
            prenom: prenom.into(),
            date_naissance,
            lieu_naissance,
        }
    }

    /// Render the canonical JCS JSON string embedded in the QR code.
    ///
    /// Keys come out sorted (`date_naissance`, `lieu_naissance`, `nom`,
    /// `prenom`) with compact separators, per RFC 8785.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_jcs::to_string(self)
    }

    /// Parse a payload back from its embedded JSON form.
    ///
    /// This is the decoding counterpart used by verifiers: scan the QR,
    /// extract the UTF-8 data, parse it here.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
