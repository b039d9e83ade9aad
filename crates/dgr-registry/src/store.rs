//! # Registry Store — Client Record Lifecycle
//!
//! The [`Registry`] root aggregate and the client create/update/bulk
//! orchestration. One `RwLock` guards all registry state; every mutating
//! operation runs validate → derive → commit inside a single write-lock
//! span, which is what makes the lifecycle invariants transactional:
//!
//! - a created client is never observable without its token and account;
//! - a failed validation leaves no partial write behind;
//! - the stored token is never stale relative to the tracked fields.
//!
//! Bulk creation is the documented exception: it validates the whole
//! batch, commits all records in one operation, and deliberately skips
//! token generation and account provisioning. Callers needing tokens and
//! accounts must create records individually.

use std::collections::{HashMap, HashSet};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use dgr_core::{AccountId, Cin, ClientId, CommuneId, RegionId, Timestamp, ValidationError};

use crate::account::{upsert_client_account, Account};
use crate::client::{token_fields_changed, Client, ClientUpdate, NewClient};
use crate::error::RegistryError;
use crate::family::validate_children_assignment;
use crate::geo::{Commune, Region};
use crate::request::DocumentRequest;

/// Tunable policy for the registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// Reject spouse assignments between clients of the same sex.
    ///
    /// Off by default: the rule exists in the registry's rulebook but has
    /// never been active in production data, and enabling it would reject
    /// records that were accepted historically.
    pub enforce_spouse_sex_difference: bool,
}

/// All persistent registry state. Guarded by the [`Registry`] lock;
/// modules in this crate reach it through `Registry::read`/`write`.
#[derive(Debug, Default)]
pub(crate) struct RegistryInner {
    pub(crate) clients: HashMap<ClientId, Client>,
    pub(crate) cin_index: HashMap<Cin, ClientId>,
    pub(crate) accounts: HashMap<AccountId, Account>,
    pub(crate) account_by_client: HashMap<ClientId, AccountId>,
    pub(crate) account_by_email: HashMap<String, AccountId>,
    pub(crate) regions: HashMap<RegionId, Region>,
    pub(crate) communes: HashMap<CommuneId, Commune>,
    /// Append-only ledger, in request order.
    pub(crate) requests: Vec<DocumentRequest>,
}

/// The canonical civil-registry store.
#[derive(Debug)]
pub struct Registry {
    config: RegistryConfig,
    inner: RwLock<RegistryInner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry with default policy.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit policy.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// The active policy.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write()
    }

    /// Create a client record.
    ///
    /// Validates every field constraint, computes and stores the identity
    /// token, and provisions exactly one linked account — all inside one
    /// transaction. No partial write on failure.
    ///
    /// # Errors
    ///
    /// `Validation` for missing fields or a duplicate CIN, `NotFound` for
    /// an unknown birthplace commune, `Integrity` if the derived account
    /// email collides with an existing account.
    pub fn create_client(&self, new: NewClient) -> Result<Client, RegistryError> {
        let now = Timestamp::now();
        let mut inner = self.write();

        let id = ClientId::new();
        let mut client = Client::from_new(id, new, now);
        validate_client_fields(&inner, &client, None)?;

        client.token = Some(regenerate_token(&inner, &client)?);
        upsert_client_account(&mut inner, &client, now)?;

        inner.cin_index.insert(client.cin.clone(), id);
        inner.clients.insert(id, client.clone());
        tracing::info!(client = %id, cin = %client.cin, "client record created");
        Ok(client)
    }

    /// Update a client record.
    ///
    /// Re-validates constraints as in [`Registry::create_client`], then
    /// computes the change-set over the tracked fields {last name, first
    /// name, date of birth, birthplace, children}. A non-empty change-set
    /// regenerates the token before the record is durable; otherwise the
    /// stored token is left untouched. The linked account is upserted so
    /// its mirrored name and CIN-derived fields stay current.
    pub fn update_client(
        &self,
        id: ClientId,
        update: ClientUpdate,
    ) -> Result<Client, RegistryError> {
        let now = Timestamp::now();
        let mut inner = self.write();

        let before = inner
            .clients
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("client {id}")))?;

        let mut after = before.clone();
        update.apply(&mut after);
        validate_client_fields(&inner, &after, Some(id))?;
        validate_children_assignment(&inner, id, &after.children)?;

        if token_fields_changed(&before, &after) {
            after.token = Some(regenerate_token(&inner, &after)?);
        }
        after.updated_at = now;

        upsert_client_account(&mut inner, &after, now)?;

        if before.cin != after.cin {
            inner.cin_index.remove(&before.cin);
            inner.cin_index.insert(after.cin.clone(), id);
        }
        inner.clients.insert(id, after.clone());
        tracing::debug!(client = %id, "client record updated");
        Ok(after)
    }

    /// Insert a batch of client records in one operation.
    ///
    /// Explicitly SKIPS token generation and account provisioning — a
    /// deliberate performance trade-off, not an oversight. The batch is
    /// all-or-nothing: any invalid record (including an intra-batch CIN
    /// duplicate) fails the whole batch with no records written.
    pub fn bulk_create_clients(
        &self,
        batch: Vec<NewClient>,
    ) -> Result<Vec<Client>, RegistryError> {
        let now = Timestamp::now();
        let mut inner = self.write();

        let clients: Vec<Client> = batch
            .into_iter()
            .map(|new| Client::from_new(ClientId::new(), new, now))
            .collect();

        let mut batch_cins = HashSet::new();
        for client in &clients {
            validate_client_fields(&inner, client, None)?;
            if !batch_cins.insert(client.cin.clone()) {
                return Err(ValidationError::DuplicateCin(client.cin.to_string()).into());
            }
        }

        for client in &clients {
            inner.cin_index.insert(client.cin.clone(), client.id);
            inner.clients.insert(client.id, client.clone());
        }
        tracing::info!(count = clients.len(), "bulk client insert committed");
        Ok(clients)
    }

    /// Fetch a client by id.
    pub fn get_client(&self, id: ClientId) -> Result<Client, RegistryError> {
        self.read()
            .clients
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("client {id}")))
    }

    /// Look up a client by CIN (canonical form).
    pub fn find_client_by_cin(&self, cin: &Cin) -> Option<Client> {
        let inner = self.read();
        let id = inner.cin_index.get(cin)?;
        inner.clients.get(id).cloned()
    }

    /// All clients, ordered by creation time then CIN for stable output.
    pub fn list_clients(&self) -> Vec<Client> {
        let mut clients: Vec<Client> = self.read().clients.values().cloned().collect();
        clients.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.cin.cmp(&b.cin))
        });
        clients
    }

    /// Number of client records.
    pub fn client_count(&self) -> usize {
        self.read().clients.len()
    }
}

/// Field and constraint validation shared by every client write path.
///
/// `exclude` carries the record's own id on updates so the CIN uniqueness
/// check does not trip over the record itself.
fn validate_client_fields(
    inner: &RegistryInner,
    candidate: &Client,
    exclude: Option<ClientId>,
) -> Result<(), RegistryError> {
    if candidate.last_name.trim().is_empty() {
        return Err(ValidationError::MissingField("nom").into());
    }
    if candidate.first_name.trim().is_empty() {
        return Err(ValidationError::MissingField("prenom").into());
    }
    if candidate.address.trim().is_empty() {
        return Err(ValidationError::MissingField("adresse").into());
    }
    if let Some(commune) = candidate.birthplace {
        if !inner.communes.contains_key(&commune) {
            return Err(RegistryError::not_found(format!("commune {commune}")));
        }
    }
    if let Some(&owner) = inner.cin_index.get(&candidate.cin) {
        if exclude != Some(owner) {
            return Err(ValidationError::DuplicateCin(candidate.cin.to_string()).into());
        }
    }
    Ok(())
}

/// Encode a fresh identity token for the record's current tracked fields.
pub(crate) fn regenerate_token(
    inner: &RegistryInner,
    client: &Client,
) -> Result<String, RegistryError> {
    let birthplace_name = client
        .birthplace
        .and_then(|id| inner.communes.get(&id))
        .map(|commune| commune.name.clone());
    let token = dgr_token::encode(&client.token_payload(birthplace_name))?;
    Ok(token.base64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dgr_core::Sex;

    pub(crate) fn new_client(cin: &str) -> NewClient {
        NewClient {
            sex: Sex::Male,
            last_name: "Rakoto".to_string(),
            first_name: "Jean".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            birthplace: None,
            address: "Lot II A 23 Antananarivo".to_string(),
            cin: Cin::new(cin).unwrap(),
            photo: None,
        }
    }

    #[test]
    fn create_fills_token_and_account() {
        let registry = Registry::new();
        let client = registry.create_client(new_client("CNI000001")).unwrap();
        assert!(client.token.is_some());

        let account = registry.account_for_client(client.id).unwrap();
        assert_eq!(account.username, "CNI000001");
        assert_eq!(account.email, "client_CNI000001@digitaratasy.mg");
        assert!(account.is_client);
        assert_eq!(account.client, Some(client.id));
    }

    #[test]
    fn create_rejects_missing_fields() {
        let registry = Registry::new();

        let mut missing_name = new_client("CNI000001");
        missing_name.last_name = "  ".to_string();
        assert!(matches!(
            registry.create_client(missing_name),
            Err(RegistryError::Validation(ValidationError::MissingField("nom")))
        ));

        let mut missing_address = new_client("CNI000002");
        missing_address.address = String::new();
        assert!(registry.create_client(missing_address).is_err());

        // Nothing was written.
        assert_eq!(registry.client_count(), 0);
        assert!(registry.list_accounts().is_empty());
    }

    #[test]
    fn create_rejects_unknown_birthplace() {
        let registry = Registry::new();
        let mut new = new_client("CNI000001");
        new.birthplace = Some(CommuneId::new());
        assert!(matches!(
            registry.create_client(new),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_cin_rejected_without_side_effects() {
        let registry = Registry::new();
        registry.create_client(new_client("CNI000001")).unwrap();

        let mut second = new_client("cni000001"); // same CIN, different case
        second.first_name = "Paul".to_string();
        let err = registry.create_client(second).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::DuplicateCin(_))
        ));

        // Exactly one record and one account exist.
        assert_eq!(registry.client_count(), 1);
        assert_eq!(registry.list_accounts().len(), 1);
    }

    #[test]
    fn update_untracked_field_keeps_token_bytes() {
        let registry = Registry::new();
        let client = registry.create_client(new_client("CNI000001")).unwrap();
        let token_before = client.token.clone().unwrap();

        let updated = registry
            .update_client(
                client.id,
                ClientUpdate {
                    address: Some("Lot III B 7 Toamasina".to_string()),
                    ..ClientUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.token.unwrap(), token_before);
    }

    #[test]
    fn update_tracked_field_regenerates_token() {
        let registry = Registry::new();
        let client = registry.create_client(new_client("CNI000001")).unwrap();
        let token_before = client.token.clone().unwrap();

        let updated = registry
            .update_client(
                client.id,
                ClientUpdate {
                    first_name: Some("Paul".to_string()),
                    ..ClientUpdate::default()
                },
            )
            .unwrap();
        let token_after = updated.token.unwrap();
        assert_ne!(token_after, token_before);
    }

    #[test]
    fn update_revalidates_cin_uniqueness() {
        let registry = Registry::new();
        registry.create_client(new_client("CNI000001")).unwrap();
        let second = registry.create_client(new_client("CNI000002")).unwrap();

        let err = registry
            .update_client(
                second.id,
                ClientUpdate {
                    cin: Some(Cin::new("CNI000001").unwrap()),
                    ..ClientUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::DuplicateCin(_))
        ));

        // Re-submitting a record's own CIN is not a duplicate.
        assert!(registry
            .update_client(
                second.id,
                ClientUpdate {
                    cin: Some(Cin::new("CNI000002").unwrap()),
                    ..ClientUpdate::default()
                },
            )
            .is_ok());
    }

    #[test]
    fn update_cin_rederives_account() {
        let registry = Registry::new();
        let client = registry.create_client(new_client("CNI000001")).unwrap();
        registry
            .update_client(
                client.id,
                ClientUpdate {
                    cin: Some(Cin::new("CNI999999").unwrap()),
                    ..ClientUpdate::default()
                },
            )
            .unwrap();

        let account = registry.account_for_client(client.id).unwrap();
        assert_eq!(account.username, "CNI999999");
        assert_eq!(account.email, "client_CNI999999@digitaratasy.mg");
        // Still exactly one account.
        assert_eq!(registry.list_accounts().len(), 1);
    }

    #[test]
    fn update_unknown_client_is_not_found() {
        let registry = Registry::new();
        assert!(matches!(
            registry.update_client(ClientId::new(), ClientUpdate::default()),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn bulk_create_skips_tokens_and_accounts() {
        let registry = Registry::new();
        let clients = registry
            .bulk_create_clients(vec![
                new_client("CNI000001"),
                new_client("CNI000002"),
                new_client("CNI000003"),
            ])
            .unwrap();

        assert_eq!(clients.len(), 3);
        for client in &clients {
            assert!(client.token.is_none());
            assert!(registry.account_for_client(client.id).is_none());
        }
        assert!(registry.list_accounts().is_empty());
    }

    #[test]
    fn bulk_create_is_all_or_nothing() {
        let registry = Registry::new();
        registry.create_client(new_client("CNI000001")).unwrap();

        // Second batch record collides with the existing CIN.
        let err = registry
            .bulk_create_clients(vec![new_client("CNI000010"), new_client("CNI000001")])
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert_eq!(registry.client_count(), 1);

        // Intra-batch duplicate also fails the batch.
        let err = registry
            .bulk_create_clients(vec![new_client("CNI000020"), new_client("CNI000020")])
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn bulk_then_individual_update_provisions_account() {
        let registry = Registry::new();
        let clients = registry
            .bulk_create_clients(vec![new_client("CNI000001")])
            .unwrap();
        let id = clients[0].id;
        assert!(registry.account_for_client(id).is_none());

        // An individual persist through the normal path provisions the
        // missing account (upsert) but leaves the token untouched when no
        // tracked field changed.
        let updated = registry
            .update_client(
                id,
                ClientUpdate {
                    address: Some("Lot I".to_string()),
                    ..ClientUpdate::default()
                },
            )
            .unwrap();
        assert!(updated.token.is_none());
        assert!(registry.account_for_client(id).is_some());
    }

    #[test]
    fn find_by_cin_uses_canonical_form() {
        let registry = Registry::new();
        let client = registry.create_client(new_client("CNI000001")).unwrap();
        let found = registry
            .find_client_by_cin(&Cin::new("cni000001").unwrap())
            .unwrap();
        assert_eq!(found.id, client.id);
    }

    #[test]
    fn list_clients_is_stably_ordered() {
        let registry = Registry::new();
        registry.create_client(new_client("CNI000002")).unwrap();
        registry.create_client(new_client("CNI000001")).unwrap();
        let first = registry.list_clients();
        let second = registry.list_clients();
        assert_eq!(first.len(), 2);
        // Deterministic: repeated listings agree despite HashMap storage.
        let order = |list: &[Client]| -> Vec<String> {
            list.iter().map(|c| c.cin.to_string()).collect()
        };
        assert_eq!(order(&first), order(&second));
    }
}
