//! # Family Relationship Graph
//!
//! Spouse and parent→child links between client records, enforced as a
//! constraint layer inside the registry's write transactions.
//!
//! - **Spouse** is symmetric with at most one partner: setting A's spouse
//!   to B sets B's spouse to A in the same operation, and a new
//!   assignment supersedes prior partners on both sides.
//! - **Children** is one asymmetric edge set with two views:
//!   `children_of(parent)` and `parents_of(child)`. A child carries at
//!   most two linked parents.
//!
//! Children-set changes are tracked fields for token freshness: any
//! mutation here regenerates the parent's identity token. (The payload
//! excludes children, so the regenerated bytes come out identical — the
//! invariant is about freshness, not content.) Spouse changes are
//! untracked and never touch the token.
//!
//! The spouse sex-difference rule is policy, not a hard constraint: it is
//! enforced only when [`RegistryConfig::enforce_spouse_sex_difference`]
//! is set, and that flag defaults to off.
//!
//! No cycle detection: parent/child depth is shallow by construction and
//! nothing traverses beyond one generation.
//!
//! [`RegistryConfig::enforce_spouse_sex_difference`]: crate::store::RegistryConfig

use std::collections::BTreeSet;

use dgr_core::{ClientId, Timestamp, ValidationError};

use crate::client::Client;
use crate::error::RegistryError;
use crate::store::{regenerate_token, Registry, RegistryInner};

/// Maximum number of linked parents per child.
pub const MAX_PARENTS: usize = 2;

/// Validate a prospective children set for `parent`.
///
/// Checks that every child exists, is not the parent itself, and would
/// not end up with more than [`MAX_PARENTS`] linked parents.
pub(crate) fn validate_children_assignment(
    inner: &RegistryInner,
    parent: ClientId,
    children: &BTreeSet<ClientId>,
) -> Result<(), RegistryError> {
    for &child in children {
        if child == parent {
            return Err(ValidationError::SelfReference.into());
        }
        if !inner.clients.contains_key(&child) {
            return Err(RegistryError::not_found(format!("client {child}")));
        }
        let other_parents = inner
            .clients
            .values()
            .filter(|c| c.id != parent && c.children.contains(&child))
            .count();
        if other_parents >= MAX_PARENTS {
            return Err(ValidationError::TooManyParents(child.to_string()).into());
        }
    }
    Ok(())
}

impl Registry {
    /// Link two clients as spouses, symmetrically, in one operation.
    ///
    /// Any prior partner of either side is widowed (their spouse field is
    /// cleared) before the new link is written. Returns both updated
    /// records, `a` first.
    ///
    /// # Errors
    ///
    /// `NotFound` if either client is missing, `Validation` for
    /// self-marriage or — when the policy flag is on — same-sex partners.
    pub fn set_spouse(
        &self,
        a: ClientId,
        b: ClientId,
    ) -> Result<(Client, Client), RegistryError> {
        if a == b {
            return Err(ValidationError::SelfReference.into());
        }
        let now = Timestamp::now();
        let mut inner = self.write();

        let sex_a = inner
            .clients
            .get(&a)
            .ok_or_else(|| RegistryError::not_found(format!("client {a}")))?
            .sex;
        let sex_b = inner
            .clients
            .get(&b)
            .ok_or_else(|| RegistryError::not_found(format!("client {b}")))?
            .sex;
        if self.config().enforce_spouse_sex_difference && sex_a == sex_b {
            return Err(ValidationError::SpouseSexConflict.into());
        }

        // Widow prior partners on both sides before linking.
        for id in [a, b] {
            let prior = inner.clients.get(&id).and_then(|c| c.spouse);
            if let Some(prior) = prior {
                if prior != a && prior != b {
                    if let Some(widowed) = inner.clients.get_mut(&prior) {
                        widowed.spouse = None;
                        widowed.updated_at = now;
                    }
                }
            }
        }

        let updated_a = {
            let client = inner
                .clients
                .get_mut(&a)
                .ok_or_else(|| RegistryError::not_found(format!("client {a}")))?;
            client.spouse = Some(b);
            client.updated_at = now;
            client.clone()
        };
        let updated_b = {
            let client = inner
                .clients
                .get_mut(&b)
                .ok_or_else(|| RegistryError::not_found(format!("client {b}")))?;
            client.spouse = Some(a);
            client.updated_at = now;
            client.clone()
        };

        tracing::debug!(%a, %b, "spouse link written");
        Ok((updated_a, updated_b))
    }

    /// Remove a client's spouse link, symmetrically. No-op when the
    /// client has no spouse.
    pub fn clear_spouse(&self, id: ClientId) -> Result<Client, RegistryError> {
        let now = Timestamp::now();
        let mut inner = self.write();

        let partner = inner
            .clients
            .get(&id)
            .ok_or_else(|| RegistryError::not_found(format!("client {id}")))?
            .spouse;

        if let Some(partner) = partner {
            if let Some(client) = inner.clients.get_mut(&partner) {
                client.spouse = None;
                client.updated_at = now;
            }
            if let Some(client) = inner.clients.get_mut(&id) {
                client.spouse = None;
                client.updated_at = now;
            }
        }
        inner
            .clients
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("client {id}")))
    }

    /// Link a child to a parent. Idempotent for an existing link.
    ///
    /// A changed children set is a tracked-field change: the parent's
    /// token is regenerated in the same transaction.
    pub fn add_child(&self, parent: ClientId, child: ClientId) -> Result<Client, RegistryError> {
        let mut desired = self
            .read()
            .clients
            .get(&parent)
            .ok_or_else(|| RegistryError::not_found(format!("client {parent}")))?
            .children
            .clone();
        desired.insert(child);
        self.set_children(parent, desired)
    }

    /// Unlink a child from a parent. No-op when the link is absent.
    pub fn remove_child(&self, parent: ClientId, child: ClientId) -> Result<Client, RegistryError> {
        let mut desired = self
            .read()
            .clients
            .get(&parent)
            .ok_or_else(|| RegistryError::not_found(format!("client {parent}")))?
            .children
            .clone();
        desired.remove(&child);
        self.set_children(parent, desired)
    }

    /// Replace a parent's children set.
    ///
    /// Validates existence, self-reference, and the two-parent cap for
    /// every member, then regenerates the parent's token iff the set
    /// actually changed.
    pub fn set_children(
        &self,
        parent: ClientId,
        children: BTreeSet<ClientId>,
    ) -> Result<Client, RegistryError> {
        let now = Timestamp::now();
        let mut inner = self.write();

        let before = inner
            .clients
            .get(&parent)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("client {parent}")))?;
        validate_children_assignment(&inner, parent, &children)?;

        if children == before.children {
            return Ok(before);
        }

        let mut after = before;
        after.children = children;
        after.token = Some(regenerate_token(&inner, &after)?);
        after.updated_at = now;
        inner.clients.insert(parent, after.clone());
        Ok(after)
    }

    /// The children linked to a parent.
    pub fn children_of(&self, parent: ClientId) -> Result<Vec<Client>, RegistryError> {
        let inner = self.read();
        let client = inner
            .clients
            .get(&parent)
            .ok_or_else(|| RegistryError::not_found(format!("client {parent}")))?;
        Ok(client
            .children
            .iter()
            .filter_map(|id| inner.clients.get(id).cloned())
            .collect())
    }

    /// The parents linked to a child — the reverse view of the same edge
    /// set.
    pub fn parents_of(&self, child: ClientId) -> Result<Vec<Client>, RegistryError> {
        let inner = self.read();
        if !inner.clients.contains_key(&child) {
            return Err(RegistryError::not_found(format!("client {child}")));
        }
        let mut parents: Vec<Client> = inner
            .clients
            .values()
            .filter(|c| c.children.contains(&child))
            .cloned()
            .collect();
        parents.sort_by(|a, b| a.cin.cmp(&b.cin));
        Ok(parents)
    }
}
