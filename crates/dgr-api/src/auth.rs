//! # Authentication Middleware
//!
//! Static bearer-token authentication for the API surface. Token
//! issuance and session management live in the external authentication
//! layer; this middleware only gates requests. Health probes and
//! `/metrics` are mounted outside it and stay reachable without
//! credentials.

use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::error::AppError;

/// Authentication configuration injected as a request extension.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` disables the check.
    pub token: Option<String>,
}

/// Reject requests without the configured bearer token.
pub async fn auth_middleware(
    Extension(config): Extension<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = &config.token {
        let provided = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        if provided != Some(expected.as_str()) {
            return AppError::Unauthorized("missing or invalid bearer token".to_string())
                .into_response();
        }
    }
    next.run(request).await
}
