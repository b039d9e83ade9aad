//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the registry.
//! Each identifier is a distinct type — you cannot pass a [`ClientId`]
//! where a [`CommuneId`] is expected.
//!
//! ## Validation
//!
//! The string-based [`Cin`] validates its format at construction time.
//! UUID-based identifiers ([`ClientId`], [`RegionId`], [`CommuneId`],
//! [`AccountId`], [`RequestId`]) are always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Helper macro for UUID-backed identifier newtypes: random constructor,
/// UUID conversions, `Display`, and `FromStr`.
macro_rules! uuid_id {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// A unique identifier for a citizen record (client).
    ClientId
}

uuid_id! {
    /// A unique identifier for an administrative region.
    RegionId
}

uuid_id! {
    /// A unique identifier for a commune within a region.
    CommuneId
}

uuid_id! {
    /// A unique identifier for a system account.
    AccountId
}

uuid_id! {
    /// A unique identifier for a document request.
    RequestId
}

/// National identity card number (CIN).
///
/// The registry's one externally issued identifier: free-form but bounded.
/// Canonical storage form is uppercase with surrounding whitespace trimmed,
/// so lookups are case-insensitive without a second index.
///
/// # Validation
///
/// - 1 to 20 characters after trimming
/// - ASCII alphanumeric only
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Cin(String);

impl_validating_deserialize!(Cin);

impl Cin {
    /// Maximum accepted length, matching the persisted column width.
    pub const MAX_LEN: usize = 20;

    /// Create a CIN from a string value, validating format.
    ///
    /// The value is trimmed and uppercased for storage consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCin`] if the value is empty,
    /// longer than [`Cin::MAX_LEN`], or contains non-alphanumeric
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let canonical = raw.trim().to_ascii_uppercase();

        if canonical.is_empty() || canonical.len() > Self::MAX_LEN {
            return Err(ValidationError::InvalidCin(raw));
        }
        if !canonical.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::InvalidCin(raw));
        }

        Ok(Self(canonical))
    }

    /// Access the canonical (trimmed, uppercase) CIN string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- ClientId --

    #[test]
    fn client_id_unique() {
        let a = ClientId::new();
        let b = ClientId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn client_id_from_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = ClientId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn client_id_display_is_uuid() {
        let id = ClientId::new();
        // UUID format: 8-4-4-4-12 = 36 chars
        assert_eq!(format!("{id}").len(), 36);
    }

    #[test]
    fn client_id_parse_roundtrip() {
        let id = ClientId::new();
        let parsed: ClientId = format!("{id}").parse().unwrap();
        assert_eq!(id, parsed);
    }

    // -- Cin --

    #[test]
    fn cin_valid() {
        let cin = Cin::new("CNI000001").unwrap();
        assert_eq!(cin.as_str(), "CNI000001");
    }

    #[test]
    fn cin_lowercase_canonicalized() {
        let cin = Cin::new("cni000001").unwrap();
        assert_eq!(cin.as_str(), "CNI000001");
    }

    #[test]
    fn cin_trimmed() {
        let cin = Cin::new("  CNI000001  ").unwrap();
        assert_eq!(cin.as_str(), "CNI000001");
    }

    #[test]
    fn cin_boundary_lengths() {
        assert!(Cin::new("A").is_ok());
        assert!(Cin::new("A".repeat(20)).is_ok());
        assert!(Cin::new("A".repeat(21)).is_err());
    }

    #[test]
    fn cin_rejects_invalid() {
        assert!(Cin::new("").is_err());
        assert!(Cin::new("   ").is_err());
        assert!(Cin::new("CNI 0001").is_err()); // inner whitespace
        assert!(Cin::new("CNI-0001").is_err()); // punctuation
    }

    #[test]
    fn cin_serde_rejects_invalid() {
        let result: Result<Cin, _> = serde_json::from_str("\"CNI-0001\"");
        assert!(result.is_err());
    }

    #[test]
    fn cin_serde_roundtrip() {
        let cin = Cin::new("CNI000001").unwrap();
        let json = serde_json::to_string(&cin).unwrap();
        let parsed: Cin = serde_json::from_str(&json).unwrap();
        assert_eq!(cin, parsed);
    }

    #[test]
    fn cin_in_hashset() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(Cin::new("CNI000001").unwrap());
        // Same CIN in a different case is the same key.
        set.insert(Cin::new("cni000001").unwrap());
        assert_eq!(set.len(), 1);
    }

    // -- serde for UUID ids --

    #[test]
    fn commune_id_serde_roundtrip() {
        let id = CommuneId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: CommuneId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
