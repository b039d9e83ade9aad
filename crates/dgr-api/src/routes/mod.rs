//! # Route Modules
//!
//! Each module defines an Axum router for one API surface area. Handlers
//! hold no business logic — they convert wire DTOs, delegate to
//! `dgr-registry`, and map errors through [`crate::error::AppError`].

pub mod accounts;
pub mod clients;
pub mod geo;
pub mod requests;
pub mod stats;
