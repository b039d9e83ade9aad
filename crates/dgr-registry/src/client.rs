//! # Client Entity
//!
//! The root entity of the registry: a citizen record. Defines the stored
//! [`Client`], the [`NewClient`]/[`ClientUpdate`] inputs, and the
//! tracked-field change detection that decides when the identity token
//! must be regenerated.
//!
//! ## Token Freshness
//!
//! A record "has changed" for token purposes iff any of the five tracked
//! fields — last name, first name, date of birth, birthplace, children
//! set — differs from the stored version, or the record is newly created.
//! The address, photo, sex, and spouse fields are untracked: updating
//! only those leaves the stored token byte-identical.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use dgr_core::{Cin, ClientId, CommuneId, Sex, Timestamp};
use dgr_token::TokenPayload;

/// A citizen record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique record identifier.
    pub id: ClientId,
    /// Registered sex.
    pub sex: Sex,
    /// Family name.
    pub last_name: String,
    /// Given name.
    pub first_name: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Birthplace commune, when recorded.
    pub birthplace: Option<CommuneId>,
    /// Residential address.
    pub address: String,
    /// National identity card number. Globally unique.
    pub cin: Cin,
    /// Stored photo reference (upload path), when present.
    pub photo: Option<String>,
    /// Current spouse. Symmetric: the spouse's record points back here.
    pub spouse: Option<ClientId>,
    /// Linked children. One edge set with `parents_of` as the other view.
    pub children: BTreeSet<ClientId>,
    /// Encoded identity token (base64 PNG). `None` only for records
    /// created through the bulk path and never since updated with a
    /// tracked-field change.
    pub token: Option<String>,
    /// When the record was created.
    pub created_at: Timestamp,
    /// When the record was last persisted.
    pub updated_at: Timestamp,
}

impl Client {
    /// Build a fresh record from creation input. Token, spouse, and
    /// children start empty; the store fills the token before commit.
    pub(crate) fn from_new(id: ClientId, new: NewClient, now: Timestamp) -> Self {
        Self {
            id,
            sex: new.sex,
            last_name: new.last_name,
            first_name: new.first_name,
            birth_date: new.birth_date,
            birthplace: new.birthplace,
            address: new.address,
            cin: new.cin,
            photo: new.photo,
            spouse: None,
            children: BTreeSet::new(),
            token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The token payload snapshot for this record.
    ///
    /// `birthplace_name` is the resolved commune name — the payload
    /// carries the name, not the identifier.
    pub fn token_payload(&self, birthplace_name: Option<String>) -> TokenPayload {
        TokenPayload::new(
            self.last_name.clone(),
            self.first_name.clone(),
            self.birth_date,
            birthplace_name,
        )
    }
}

/// Whether any token-tracked field differs between two versions of a
/// record.
pub(crate) fn token_fields_changed(before: &Client, after: &Client) -> bool {
    before.last_name != after.last_name
        || before.first_name != after.first_name
        || before.birth_date != after.birth_date
        || before.birthplace != after.birthplace
        || before.children != after.children
}

/// Input for creating a client record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    /// Registered sex.
    pub sex: Sex,
    /// Family name. Required non-empty.
    pub last_name: String,
    /// Given name. Required non-empty.
    pub first_name: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Birthplace commune. Must exist when given.
    pub birthplace: Option<CommuneId>,
    /// Residential address. Required non-empty.
    pub address: String,
    /// National identity card number. Must be unused.
    pub cin: Cin,
    /// Stored photo reference.
    pub photo: Option<String>,
}

/// Partial update of a client record. Absent fields are left unchanged;
/// the double-`Option` fields distinguish "leave as is" from "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    /// New registered sex.
    pub sex: Option<Sex>,
    /// New family name.
    pub last_name: Option<String>,
    /// New given name.
    pub first_name: Option<String>,
    /// New date of birth.
    pub birth_date: Option<NaiveDate>,
    /// New birthplace (`Some(None)` clears it).
    pub birthplace: Option<Option<CommuneId>>,
    /// New address.
    pub address: Option<String>,
    /// New CIN. Uniqueness is re-checked, excluding this record.
    pub cin: Option<Cin>,
    /// New photo reference (`Some(None)` clears it).
    pub photo: Option<Option<String>>,
    /// Replacement children set.
    pub children: Option<BTreeSet<ClientId>>,
}

impl ClientUpdate {
    /// Apply this update to a copy of the stored record.
    pub(crate) fn apply(self, client: &mut Client) {
        if let Some(sex) = self.sex {
            client.sex = sex;
        }
        if let Some(last_name) = self.last_name {
            client.last_name = last_name;
        }
        if let Some(first_name) = self.first_name {
            client.first_name = first_name;
        }
        if let Some(birth_date) = self.birth_date {
            client.birth_date = birth_date;
        }
        if let Some(birthplace) = self.birthplace {
            client.birthplace = birthplace;
        }
        if let Some(address) = self.address {
            client.address = address;
        }
        if let Some(cin) = self.cin {
            client.cin = cin;
        }
        if let Some(photo) = self.photo {
            client.photo = photo;
        }
        if let Some(children) = self.children {
            client.children = children;
        }
    }
}
