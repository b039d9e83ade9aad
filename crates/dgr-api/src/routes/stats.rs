//! # Statistics Route
//!
//! `GET /v1/stats` — the reporting layer's read projection. No logic
//! beyond delegating to the registry's aggregate snapshot.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use dgr_registry::Statistics;

use crate::state::AppState;

/// Build the statistics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/stats", get(statistics))
}

async fn statistics(State(state): State<AppState>) -> Json<Statistics> {
    Json(state.registry.statistics())
}
