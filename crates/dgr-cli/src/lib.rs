//! # dgr-cli — CLI for the Civil Registry
//!
//! Provides the `dgr` command-line interface.
//!
//! ## Subcommands
//!
//! - `dgr serve` — run the API service, optionally pre-seeded.
//! - `dgr seed` — generate realistic client records with family
//!   relationships and print a summary.
//! - `dgr token` — render an identity token for ad-hoc field values.

pub mod seed;
pub mod serve;
pub mod token;
