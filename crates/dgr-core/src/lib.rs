//! # dgr-core — Foundational Types for the Civil Registry
//!
//! This crate is the bedrock of the Digitaratasy backend. It defines the
//! domain primitives shared by every other crate in the workspace; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `ClientId`, `RegionId`,
//!    `CommuneId`, `AccountId`, `RequestId`, `Cin` — all newtypes, the
//!    string-backed ones with validated constructors. No bare strings or
//!    bare UUIDs for identifiers.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision, so every stored instant renders the
//!    same way everywhere.
//!
//! 3. **Validation at the boundary.** Deserializing a `Cin` or a `Sex`
//!    routes through the same constructor as programmatic use; invalid
//!    values are rejected at parse time, not discovered downstream.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dgr-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod person;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::ValidationError;
pub use identity::{AccountId, Cin, ClientId, CommuneId, RegionId, RequestId};
pub use person::Sex;
pub use temporal::Timestamp;
