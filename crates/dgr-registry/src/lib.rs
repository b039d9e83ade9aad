//! # dgr-registry — Civil Registry Domain
//!
//! The canonical store for citizen records and everything whose lifecycle
//! hangs off them: identity tokens, provisioned accounts, family
//! relationships, document requests, and the region/commune lookup
//! hierarchy.
//!
//! ## Transactional Model
//!
//! A single [`Registry`] owns all state behind one `parking_lot::RwLock`.
//! Every mutating operation holds the write lock for its full
//! validate → derive → commit span, so token regeneration and account
//! provisioning are atomic with the record write they depend on: no
//! caller can ever observe a created client without its account, or a
//! record whose token is stale relative to its tracked fields.
//!
//! ## Modules
//!
//! - [`store`] — the `Registry` root and the client create/update/bulk
//!   orchestration.
//! - [`client`] — the `Client` entity, its inputs, and tracked-field
//!   change detection.
//! - [`account`] — account entity, provisioning derivation, credentials,
//!   and the reset-code flow.
//! - [`family`] — spouse symmetry and the parent→child edge set.
//! - [`request`] — the append-only document request ledger.
//! - [`geo`] — regions and communes.
//! - [`stats`] — read-only aggregate projections.

pub mod account;
pub mod client;
pub mod error;
pub mod family;
pub mod geo;
pub mod request;
pub mod stats;
pub mod store;

pub use account::{Account, ResetOutcome, MAX_RESET_ATTEMPTS, RESET_CODE_TTL_MINUTES};
pub use client::{Client, ClientUpdate, NewClient};
pub use error::RegistryError;
pub use geo::{Commune, NewCommune, Region};
pub use request::{ActType, DocumentRequest, DEFAULT_REQUEST_STATUS};
pub use stats::{CommuneClientCount, Statistics};
pub use store::{Registry, RegistryConfig};
