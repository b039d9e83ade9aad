//! End-to-end scenarios over the client record lifecycle: creation with
//! token and account side effects, tracked-field change detection,
//! family symmetry, bulk semantics, and the reset-code flow.

use chrono::NaiveDate;

use dgr_core::{Cin, Sex};
use dgr_registry::{
    ActType, ClientUpdate, NewClient, NewCommune, Registry, ResetOutcome, MAX_RESET_ATTEMPTS,
};
use dgr_token::TokenPayload;

fn new_client(cin: &str, first: &str, last: &str) -> NewClient {
    NewClient {
        sex: Sex::Male,
        last_name: last.to_string(),
        first_name: first.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        birthplace: None,
        address: "Lot II A 23 Antananarivo".to_string(),
        cin: Cin::new(cin).unwrap(),
        photo: None,
    }
}

/// Derive the token a record with these fields must carry. Tokens are
/// byte-for-byte reproducible from the tracked-field snapshot, so this
/// is the ground truth the store has to match.
fn expected_token(first: &str, last: &str, birthplace: Option<&str>) -> String {
    let payload = TokenPayload::new(
        last,
        first,
        NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        birthplace.map(str::to_string),
    );
    dgr_token::encode(&payload).unwrap().base64
}

#[test]
fn created_record_token_decodes_to_its_fields() {
    let registry = Registry::new();
    let region = registry.create_region("Analamanga").unwrap();
    let commune = registry
        .create_commune(NewCommune {
            name: "Antananarivo".to_string(),
            region: region.id,
            admin: None,
        })
        .unwrap();

    let mut new = new_client("CNI000001", "Jean", "Rakoto");
    new.birthplace = Some(commune.id);
    let client = registry.create_client(new).unwrap();

    let stored = registry.get_client(client.id).unwrap();
    assert_eq!(
        stored.token.unwrap(),
        expected_token("Jean", "Rakoto", Some("Antananarivo"))
    );
}

#[test]
fn creation_provisions_exactly_one_account() {
    let registry = Registry::new();
    let client = registry
        .create_client(new_client("CNI000001", "Jean", "Rakoto"))
        .unwrap();

    let accounts = registry.list_accounts();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].client, Some(client.id));
    assert_eq!(accounts[0].username, "CNI000001");
    assert_eq!(accounts[0].email, "client_CNI000001@digitaratasy.mg");
    assert!(accounts[0].is_client);

    // The initial credential is the CIN, usable for login.
    assert!(registry
        .verify_credentials("client_CNI000001@digitaratasy.mg", "CNI000001")
        .is_ok());
}

#[test]
fn address_only_update_leaves_token_byte_identical() {
    let registry = Registry::new();
    let client = registry
        .create_client(new_client("CNI000001", "Jean", "Rakoto"))
        .unwrap();
    let before = client.token.clone().unwrap();

    let updated = registry
        .update_client(
            client.id,
            ClientUpdate {
                address: Some("Lot VII F 2 Fianarantsoa".to_string()),
                ..ClientUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(updated.token.unwrap(), before);
}

#[test]
fn first_name_update_regenerates_token_with_new_value() {
    let registry = Registry::new();
    let client = registry
        .create_client(new_client("CNI000001", "Jean", "Rakoto"))
        .unwrap();
    let before = client.token.clone().unwrap();

    let updated = registry
        .update_client(
            client.id,
            ClientUpdate {
                first_name: Some("Paul".to_string()),
                ..ClientUpdate::default()
            },
        )
        .unwrap();

    let after = updated.token.unwrap();
    assert_ne!(after, before);
    assert_eq!(after, expected_token("Paul", "Rakoto", None));
}

#[test]
fn spouse_write_is_observable_from_both_sides() {
    let registry = Registry::new();
    let a = registry
        .create_client(new_client("CNI000001", "Jean", "Rakoto"))
        .unwrap();
    let mut wife = new_client("CNI000002", "Jeanne", "Rasoa");
    wife.sex = Sex::Female;
    let b = registry.create_client(wife).unwrap();

    registry.set_spouse(a.id, b.id).unwrap();

    assert_eq!(registry.get_client(a.id).unwrap().spouse, Some(b.id));
    assert_eq!(registry.get_client(b.id).unwrap().spouse, Some(a.id));
}

#[test]
fn duplicate_cin_creates_nothing_for_the_loser() {
    let registry = Registry::new();
    registry
        .create_client(new_client("CNI000001", "Jean", "Rakoto"))
        .unwrap();

    let err = registry
        .create_client(new_client("CNI000001", "Paul", "Rabe"))
        .unwrap_err();
    assert!(matches!(err, dgr_registry::RegistryError::Validation(_)));

    // No second record, token, or account came into being.
    assert_eq!(registry.client_count(), 1);
    assert_eq!(registry.list_accounts().len(), 1);
    assert!(registry
        .find_client_by_cin(&Cin::new("CNI000001").unwrap())
        .map(|c| c.first_name)
        .as_deref()
        == Some("Jean"));
}

#[test]
fn bulk_create_persists_records_without_side_effects() {
    let registry = Registry::new();
    let clients = registry
        .bulk_create_clients(vec![
            new_client("CNI000001", "Jean", "Rakoto"),
            new_client("CNI000002", "Paul", "Rabe"),
            new_client("CNI000003", "Hery", "Randria"),
        ])
        .unwrap();

    assert_eq!(clients.len(), 3);
    assert_eq!(registry.client_count(), 3);
    assert!(registry.list_accounts().is_empty());
    for client in clients {
        assert!(registry.get_client(client.id).unwrap().token.is_none());
    }
}

#[test]
fn reset_code_locks_out_after_three_incorrect_attempts() {
    let registry = Registry::new();
    let client = registry
        .create_client(new_client("CNI000001", "Jean", "Rakoto"))
        .unwrap();
    let account = registry.account_for_client(client.id).unwrap();

    let code = registry.generate_reset_code(account.id).unwrap();
    for _ in 0..MAX_RESET_ATTEMPTS {
        assert_eq!(
            registry.validate_reset_code(account.id, "000000").unwrap(),
            ResetOutcome::Incorrect
        );
    }

    // Fourth attempt with the *correct* code is still rejected.
    assert_eq!(
        registry.validate_reset_code(account.id, &code).unwrap(),
        ResetOutcome::TooManyAttempts
    );
}

#[test]
fn document_requests_reference_existing_clients_only() {
    let registry = Registry::new();
    let client = registry
        .create_client(new_client("CNI000001", "Jean", "Rakoto"))
        .unwrap();

    let request = registry
        .create_document_request(client.id, ActType::BirthCertificate, None)
        .unwrap();
    assert_eq!(request.status, dgr_registry::DEFAULT_REQUEST_STATUS);

    let ledger = registry.list_document_requests(Some(client.id));
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].id, request.id);
}

#[test]
fn statistics_track_the_full_scenario() {
    let registry = Registry::new();
    let region = registry.create_region("Analamanga").unwrap();
    let commune = registry
        .create_commune(NewCommune {
            name: "Antananarivo".to_string(),
            region: region.id,
            admin: None,
        })
        .unwrap();

    let mut new = new_client("CNI000001", "Jean", "Rakoto");
    new.birthplace = Some(commune.id);
    let client = registry.create_client(new).unwrap();
    registry
        .create_document_request(client.id, ActType::IdCard, None)
        .unwrap();

    let stats = registry.statistics();
    assert_eq!(stats.clients, 1);
    assert_eq!(stats.accounts, 1);
    assert_eq!(stats.document_requests, 1);
    assert_eq!(stats.requests_by_type["Carte d'identité (CIN)"], 1);
    assert_eq!(stats.clients_by_birthplace[0].count, 1);
}
