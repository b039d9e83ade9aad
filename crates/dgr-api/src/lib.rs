//! # dgr-api — Axum API Services for the Civil Registry
//!
//! The service layer over `dgr-registry`, built on Axum/Tower/Tokio.
//! Request/response types are compile-time contracts via serde derive;
//! handlers hold no business logic and delegate every decision to the
//! registry.
//!
//! ## API Surface
//!
//! | Prefix                  | Module               | Domain                    |
//! |-------------------------|----------------------|---------------------------|
//! | `/v1/clients/*`         | [`routes::clients`]  | Citizen records + family  |
//! | `/v1/demandes/*`        | [`routes::requests`] | Document request ledger   |
//! | `/v1/regions`, `/v1/communes` | [`routes::geo`] | Lookup hierarchy         |
//! | `/v1/admin-communes`, `/v1/auth/*` | [`routes::accounts`] | Accounts, resets |
//! | `/v1/stats`             | [`routes::stats`]    | Reporting projection      |
//! | `/openapi.json`         | [`openapi`]          | Schema export             |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! Health probes (`/health/*`) and `/metrics` are mounted outside the
//! auth middleware so they remain reachable without credentials.

pub mod auth;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use dgr_registry::ActType;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;

pub use error::AppError;
pub use state::{ApiConfig, AppState};

/// Assemble the full application router with all routes and middleware.
///
/// Body size limit: 2 MiB, which comfortably covers bulk client batches
/// while bounding memory per request.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();

    let api = Router::new()
        .merge(routes::clients::router())
        .merge(routes::requests::router())
        .merge(routes::geo::router())
        .merge(routes::accounts::router())
        .merge(routes::stats::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(Extension(metrics.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated: health probes and the metrics scrape endpoint.
    let unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .route("/metrics", axum::routing::get(prometheus_metrics))
        .layer(Extension(metrics))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus scrape endpoint.
///
/// Updates domain gauges from current registry state on each scrape
/// (pull model), then encodes all metrics in text exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    let stats = state.registry.statistics();
    metrics.clients_total().set(stats.clients as f64);
    metrics.accounts_total().set(stats.accounts as f64);
    metrics.document_requests_total().reset();
    for act_type in ActType::ALL {
        let count = stats
            .requests_by_type
            .get(act_type.label())
            .copied()
            .unwrap_or(0);
        metrics
            .document_requests_total()
            .with_label_values(&[act_type.as_str()])
            .set(count as f64);
    }

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — 200 whenever the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the registry lock is acquirable and the
/// stores respond.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.registry.client_count();
    let _ = state.registry.list_regions();
    (StatusCode::OK, "ready")
}
