//! # Account and Password Routes
//!
//! - `POST /v1/admin-communes` — create a commune-administrator account
//! - `POST /v1/auth/forgot-password` — issue a reset code (delivery is
//!   the email collaborator's concern; this service only records it)
//! - `POST /v1/auth/reset-password` — validate a code and set a new
//!   password; rejection reasons are explicit, never swallowed
//! - `POST /v1/auth/change-password` — authenticated rotation
//!
//! Credential verification and session issuance live in the external
//! authentication layer; these routes only cover the account lifecycle
//! the registry owns.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use dgr_registry::Account;

use crate::error::AppError;
use crate::state::AppState;

/// Build the account router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/admin-communes", post(create_commune_admin))
        .route("/v1/auth/forgot-password", post(forgot_password))
        .route("/v1/auth/reset-password", post(reset_password))
        .route("/v1/auth/change-password", post(change_password))
}

/// Request body for creating a commune-administrator account.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminCommuneCreateRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// An account on the wire. The credential hash never leaves the service.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_client: bool,
    pub is_admin_commune: bool,
    pub client: Option<Uuid>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: *account.id.as_uuid(),
            username: account.username,
            email: account.email,
            is_client: account.is_client,
            is_admin_commune: account.is_commune_admin,
            client: account.client.map(|c| *c.as_uuid()),
        }
    }
}

/// Request body for initiating a password reset.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for completing a password reset.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Request body for an authenticated password change.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

/// Outcome envelope for the reset endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetOutcomeResponse {
    /// `accepted`, `expired`, `too_many_attempts`, or `incorrect`.
    pub outcome: String,
}

async fn create_commune_admin(
    State(state): State<AppState>,
    Json(body): Json<AdminCommuneCreateRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account =
        state
            .registry
            .create_commune_admin(&body.username, &body.email, &body.password)?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, AppError> {
    let account = state
        .registry
        .find_account_by_email(&body.email)
        .ok_or_else(|| AppError::NotFound(format!("account {}", body.email)))?;

    // The code itself goes to the delivery collaborator, never into the
    // response or the logs.
    let _code = state.registry.generate_reset_code(account.id)?;
    tracing::info!(email = %body.email, "reset code issued, handed to delivery");
    Ok(StatusCode::ACCEPTED)
}

async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Response, AppError> {
    let account = state
        .registry
        .find_account_by_email(&body.email)
        .ok_or_else(|| AppError::NotFound(format!("account {}", body.email)))?;

    let outcome = state
        .registry
        .reset_password(account.id, &body.code, &body.new_password)?;

    // Rejections are explicit domain outcomes, reported with 422 so the
    // caller can distinguish them from transport failures.
    let status = if outcome.is_accepted() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    Ok((
        status,
        Json(ResetOutcomeResponse {
            outcome: outcome.as_str().to_string(),
        }),
    )
        .into_response())
}

async fn change_password(
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    let account = state
        .registry
        .verify_credentials(&body.email, &body.old_password)
        .map_err(|_| AppError::Unauthorized("invalid credentials".to_string()))?;
    state
        .registry
        .change_password(account.id, &body.new_password)?;
    Ok(StatusCode::NO_CONTENT)
}
