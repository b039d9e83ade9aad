//! # Document Request Routes
//!
//! - `POST /v1/demandes` — file a request (status defaults to pending)
//! - `GET  /v1/demandes` — list, optionally `?client=<uuid>`
//! - `GET  /v1/demandes/:id` — retrieve
//! - `PUT  /v1/demandes/:id/statut` — status transition (external
//!   collaborator's operation; the core enforces no state machine)

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use dgr_core::{ClientId, RequestId};
use dgr_registry::{ActType, DocumentRequest};

use crate::error::AppError;
use crate::state::AppState;

/// Build the document-request router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/demandes", post(create_request).get(list_requests))
        .route("/v1/demandes/:id", get(get_request))
        .route("/v1/demandes/:id/statut", put(set_status))
}

/// Request body for filing a document request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DemandeCreateRequest {
    /// The requesting client's id.
    pub client: Uuid,
    /// Document type wire code (`naissance`, `copie`, `cin`, `mariage`,
    /// `legalise`, `divorce`, `decès`).
    pub type_acte: String,
    /// Initial status. Defaults to pending when absent.
    #[serde(default)]
    pub statut: Option<String>,
}

/// Request body for a status transition.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    /// The new status string.
    pub statut: String,
}

/// Query filter for listing requests.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilter {
    /// Restrict to one client.
    pub client: Option<Uuid>,
}

/// A document request on the wire.
#[derive(Debug, Serialize, ToSchema)]
pub struct DemandeResponse {
    pub id: Uuid,
    pub client: Uuid,
    pub type_acte: String,
    pub date_demande: String,
    pub statut: String,
}

impl From<DocumentRequest> for DemandeResponse {
    fn from(request: DocumentRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            client: *request.client.as_uuid(),
            type_acte: request.act_type.as_str().to_string(),
            date_demande: request.requested_at.to_iso8601(),
            statut: request.status,
        }
    }
}

async fn create_request(
    State(state): State<AppState>,
    Json(body): Json<DemandeCreateRequest>,
) -> Result<(StatusCode, Json<DemandeResponse>), AppError> {
    let act_type =
        ActType::parse(&body.type_acte).map_err(|e| AppError::Validation(e.to_string()))?;
    let request = state.registry.create_document_request(
        ClientId::from_uuid(body.client),
        act_type,
        body.statut,
    )?;
    Ok((StatusCode::CREATED, Json(request.into())))
}

async fn list_requests(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Json<Vec<DemandeResponse>> {
    Json(
        state
            .registry
            .list_document_requests(filter.client.map(ClientId::from_uuid))
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DemandeResponse>, AppError> {
    let request = state
        .registry
        .get_document_request(RequestId::from_uuid(id))?;
    Ok(Json(request.into()))
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<DemandeResponse>, AppError> {
    let request = state
        .registry
        .set_document_request_status(RequestId::from_uuid(id), &body.statut)?;
    Ok(Json(request.into()))
}
