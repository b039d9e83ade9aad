//! # Accounts — Provisioning, Credentials, Reset Codes
//!
//! A system account is owned by the lifecycle of at most one client: the
//! account holds the reference, never the client. Client accounts are
//! derived deterministically from the record's CIN and kept in sync by an
//! upsert keyed on the client reference — creating a client twice, or
//! updating it any number of times, can never yield a second account.
//!
//! Derivation:
//!
//! - username = CIN
//! - email = `client_{CIN}@digitaratasy.mg`
//! - initial credential = the CIN itself (Argon2id-hashed; documented as
//!   the initial password, expected to be rotated by the citizen)
//!
//! The module also carries the commune-administrator accounts and the
//! password-reset challenge flow (6-digit code, 10-minute expiry, 3
//! attempts). Delivery of the code is the caller's concern.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use dgr_core::{AccountId, Cin, ClientId, Timestamp, ValidationError};

use crate::client::Client;
use crate::error::RegistryError;
use crate::store::{Registry, RegistryInner};

/// Domain of all derived client-account email addresses.
pub const CLIENT_EMAIL_DOMAIN: &str = "digitaratasy.mg";

/// Reset codes expire this many minutes after issuance.
pub const RESET_CODE_TTL_MINUTES: i64 = 10;

/// A reset code is dead after this many incorrect attempts.
pub const MAX_RESET_ATTEMPTS: u8 = 3;

/// A system login identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Login username. For client accounts this is the CIN.
    pub username: String,
    /// Login email. Globally unique.
    pub email: String,
    /// Argon2id password hash. Never the cleartext.
    pub password_hash: String,
    /// Given name, mirrored from the client record.
    pub first_name: String,
    /// Family name, mirrored from the client record.
    pub last_name: String,
    /// Whether this account represents a citizen.
    pub is_client: bool,
    /// Whether this account administers a commune.
    pub is_commune_admin: bool,
    /// The client this account is provisioned for, if any. At most one
    /// account per client.
    pub client: Option<ClientId>,
    /// Active password-reset challenge, if one has been issued.
    pub reset: Option<ResetChallenge>,
    /// When the account was created.
    pub created_at: Timestamp,
}

/// A short-lived password-reset challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetChallenge {
    /// The 6-digit code.
    pub code: String,
    /// Issuance time plus [`RESET_CODE_TTL_MINUTES`].
    pub expires_at: Timestamp,
    /// Incorrect attempts so far. Capped at [`MAX_RESET_ATTEMPTS`].
    pub attempts: u8,
}

/// Outcome of validating a reset code. These are domain-level rejection
/// reasons returned as values — never exceptions crossing the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetOutcome {
    /// Code matched; the challenge is consumed.
    Accepted,
    /// No live challenge, or the challenge's expiry has passed. Does not
    /// consume an attempt.
    Expired,
    /// The attempt cap was already reached. Returned even when the
    /// presented code is correct. Does not consume an attempt.
    TooManyAttempts,
    /// Wrong code. Consumes one attempt.
    Incorrect,
}

impl ResetOutcome {
    /// Whether the code was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The wire rendering of this outcome.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Expired => "expired",
            Self::TooManyAttempts => "too_many_attempts",
            Self::Incorrect => "incorrect",
        }
    }
}

impl std::fmt::Display for ResetOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived email address for a client account.
pub fn client_email(cin: &Cin) -> String {
    format!("client_{}@{}", cin.as_str(), CLIENT_EMAIL_DOMAIN)
}

/// Hash a password with Argon2id and a fresh random salt.
pub(crate) fn hash_password(password: &str) -> Result<String, RegistryError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RegistryError::Integrity(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored Argon2id hash.
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Ensure exactly one account exists for `client`, creating or updating
/// in place. Keyed on the client reference, not the derived fields, so a
/// CIN change re-derives username and email on the same account.
///
/// Runs inside the caller's write transaction.
pub(crate) fn upsert_client_account(
    inner: &mut RegistryInner,
    client: &Client,
    now: Timestamp,
) -> Result<AccountId, RegistryError> {
    let email = client_email(&client.cin);
    let username = client.cin.as_str().to_string();

    // The derived email may only be taken by this client's own account.
    if let Some(&holder) = inner.account_by_email.get(&email) {
        if inner.account_by_client.get(&client.id) != Some(&holder) {
            return Err(RegistryError::Integrity(format!(
                "derived email {email} is already registered to another account"
            )));
        }
    }

    match inner.account_by_client.get(&client.id).copied() {
        Some(account_id) => {
            let account = inner.accounts.get_mut(&account_id).ok_or_else(|| {
                RegistryError::Integrity(format!(
                    "account index references missing account {account_id}"
                ))
            })?;
            if account.email != email {
                inner.account_by_email.remove(&account.email);
                inner.account_by_email.insert(email.clone(), account_id);
                account.email = email;
            }
            account.username = username;
            account.first_name = client.first_name.clone();
            account.last_name = client.last_name.clone();
            Ok(account_id)
        }
        None => {
            let id = AccountId::new();
            let account = Account {
                id,
                username,
                email: email.clone(),
                // Initial password = CIN; rotated by the citizen.
                password_hash: hash_password(client.cin.as_str())?,
                first_name: client.first_name.clone(),
                last_name: client.last_name.clone(),
                is_client: true,
                is_commune_admin: false,
                client: Some(client.id),
                reset: None,
                created_at: now,
            };
            inner.accounts.insert(id, account);
            inner.account_by_client.insert(client.id, id);
            inner.account_by_email.insert(email, id);
            Ok(id)
        }
    }
}

impl Registry {
    /// Create a commune-administrator account.
    ///
    /// # Errors
    ///
    /// `Validation` for empty fields, `Integrity` if the email is taken.
    pub fn create_commune_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Account, RegistryError> {
        if username.trim().is_empty() {
            return Err(ValidationError::MissingField("username").into());
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(ValidationError::MissingField("email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }

        let now = Timestamp::now();
        let mut inner = self.write();
        if inner.account_by_email.contains_key(email) {
            return Err(RegistryError::Integrity(format!(
                "email {email} is already registered"
            )));
        }

        let id = AccountId::new();
        let account = Account {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            first_name: String::new(),
            last_name: String::new(),
            is_client: false,
            is_commune_admin: true,
            client: None,
            reset: None,
            created_at: now,
        };
        inner.accounts.insert(id, account.clone());
        inner.account_by_email.insert(account.email.clone(), id);
        tracing::info!(account = %id, email, "commune administrator account created");
        Ok(account)
    }

    /// Fetch an account by id.
    pub fn get_account(&self, id: AccountId) -> Result<Account, RegistryError> {
        self.read()
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("account {id}")))
    }

    /// The account provisioned for a client, if any.
    pub fn account_for_client(&self, client: ClientId) -> Option<Account> {
        let inner = self.read();
        let id = inner.account_by_client.get(&client)?;
        inner.accounts.get(id).cloned()
    }

    /// Look up an account by login email.
    pub fn find_account_by_email(&self, email: &str) -> Option<Account> {
        let inner = self.read();
        let id = inner.account_by_email.get(email)?;
        inner.accounts.get(id).cloned()
    }

    /// Look up an account by username. Usernames are not unique (emails
    /// are); the first match in unspecified order is returned.
    pub fn find_account_by_username(&self, username: &str) -> Option<Account> {
        self.read()
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned()
    }

    /// All accounts, in unspecified order.
    pub fn list_accounts(&self) -> Vec<Account> {
        self.read().accounts.values().cloned().collect()
    }

    /// Verify login credentials for the authentication layer.
    ///
    /// # Errors
    ///
    /// Unknown email and wrong password both surface as the same
    /// `NotFound`, so the response does not reveal which part failed.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<Account, RegistryError> {
        let account = self
            .find_account_by_email(email)
            .ok_or_else(|| RegistryError::not_found("account with matching credentials"))?;
        if verify_password(&account.password_hash, password) {
            Ok(account)
        } else {
            Err(RegistryError::not_found("account with matching credentials"))
        }
    }

    /// Remove an account. Commune admin references to it are nulled, not
    /// cascaded.
    pub fn remove_account(&self, id: AccountId) -> Result<(), RegistryError> {
        let mut inner = self.write();
        let account = inner
            .accounts
            .remove(&id)
            .ok_or_else(|| RegistryError::not_found(format!("account {id}")))?;
        inner.account_by_email.remove(&account.email);
        if let Some(client) = account.client {
            inner.account_by_client.remove(&client);
        }
        for commune in inner.communes.values_mut() {
            if commune.admin == Some(id) {
                commune.admin = None;
            }
        }
        Ok(())
    }

    /// Issue a fresh 6-digit reset code for an account: sets the code,
    /// a [`RESET_CODE_TTL_MINUTES`]-minute expiry, and resets the attempt
    /// counter. Returns the code for the caller to deliver.
    pub fn generate_reset_code(&self, id: AccountId) -> Result<String, RegistryError> {
        self.generate_reset_code_at(id, Timestamp::now())
    }

    /// [`Registry::generate_reset_code`] with an explicit issuance time.
    pub fn generate_reset_code_at(
        &self,
        id: AccountId,
        now: Timestamp,
    ) -> Result<String, RegistryError> {
        let mut inner = self.write();
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or_else(|| RegistryError::not_found(format!("account {id}")))?;

        let code = rand::thread_rng().gen_range(100_000..=999_999).to_string();
        account.reset = Some(ResetChallenge {
            code: code.clone(),
            expires_at: now.plus_minutes(RESET_CODE_TTL_MINUTES),
            attempts: 0,
        });
        tracing::info!(account = %id, "reset code issued");
        Ok(code)
    }

    /// Validate a presented reset code.
    ///
    /// The attempt counter increments only on [`ResetOutcome::Incorrect`]
    /// — expired codes and capped challenges do not consume attempts.
    /// Once [`MAX_RESET_ATTEMPTS`] incorrect attempts have accrued, every
    /// further presentation returns [`ResetOutcome::TooManyAttempts`],
    /// even with the correct code.
    pub fn validate_reset_code(
        &self,
        id: AccountId,
        code: &str,
    ) -> Result<ResetOutcome, RegistryError> {
        self.validate_reset_code_at(id, code, Timestamp::now())
    }

    /// [`Registry::validate_reset_code`] with an explicit validation time.
    pub fn validate_reset_code_at(
        &self,
        id: AccountId,
        code: &str,
        now: Timestamp,
    ) -> Result<ResetOutcome, RegistryError> {
        let mut inner = self.write();
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or_else(|| RegistryError::not_found(format!("account {id}")))?;

        let Some(challenge) = account.reset.as_mut() else {
            return Ok(ResetOutcome::Expired);
        };
        if challenge.attempts >= MAX_RESET_ATTEMPTS {
            return Ok(ResetOutcome::TooManyAttempts);
        }
        if now > challenge.expires_at {
            return Ok(ResetOutcome::Expired);
        }
        if challenge.code != code {
            challenge.attempts += 1;
            return Ok(ResetOutcome::Incorrect);
        }

        account.reset = None;
        Ok(ResetOutcome::Accepted)
    }

    /// Validate a reset code and, on acceptance, set the new password in
    /// the same transaction.
    pub fn reset_password(
        &self,
        id: AccountId,
        code: &str,
        new_password: &str,
    ) -> Result<ResetOutcome, RegistryError> {
        self.reset_password_at(id, code, new_password, Timestamp::now())
    }

    /// [`Registry::reset_password`] with an explicit validation time.
    pub fn reset_password_at(
        &self,
        id: AccountId,
        code: &str,
        new_password: &str,
        now: Timestamp,
    ) -> Result<ResetOutcome, RegistryError> {
        if new_password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }
        let outcome = self.validate_reset_code_at(id, code, now)?;
        if outcome.is_accepted() {
            let hash = hash_password(new_password)?;
            let mut inner = self.write();
            let account = inner
                .accounts
                .get_mut(&id)
                .ok_or_else(|| RegistryError::not_found(format!("account {id}")))?;
            account.password_hash = hash;
            tracing::info!(account = %id, "password reset completed");
        }
        Ok(outcome)
    }

    /// Replace an account's password.
    pub fn change_password(&self, id: AccountId, new_password: &str) -> Result<(), RegistryError> {
        if new_password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }
        let hash = hash_password(new_password)?;
        let mut inner = self.write();
        let account = inner
            .accounts
            .get_mut(&id)
            .ok_or_else(|| RegistryError::not_found(format!("account {id}")))?;
        account.password_hash = hash;
        Ok(())
    }
}
