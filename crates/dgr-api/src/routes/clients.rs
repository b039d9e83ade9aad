//! # Client Routes
//!
//! The citizen-record surface:
//!
//! - `POST   /v1/clients` — create one record (token + account side effects)
//! - `POST   /v1/clients/bulk` — bulk insert (no side effects)
//! - `GET    /v1/clients` — list
//! - `GET    /v1/clients/:id` — retrieve
//! - `PUT    /v1/clients/:id` — update (tracked-field change detection)
//! - `PUT    /v1/clients/:id/conjoint` — set spouse (symmetric)
//! - `DELETE /v1/clients/:id/conjoint` — clear spouse (symmetric)
//! - `PUT    /v1/clients/:id/enfants` — replace children set
//!
//! Wire field names keep the registry's historical French keys (`nom`,
//! `prenom`, `cin`, ...) for compatibility with deployed consumers.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use dgr_core::{Cin, ClientId, CommuneId, Sex};
use dgr_registry::{Client, ClientUpdate, NewClient};

use crate::error::AppError;
use crate::state::AppState;

/// Build the client router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/clients", post(create_client).get(list_clients))
        .route("/v1/clients/bulk", post(bulk_create_clients))
        .route("/v1/clients/:id", get(get_client).put(update_client))
        .route(
            "/v1/clients/:id/conjoint",
            put(set_spouse).delete(clear_spouse),
        )
        .route("/v1/clients/:id/enfants", put(set_children))
}

/// Deserialize a present-but-possibly-null field into `Some(Option<T>)`,
/// leaving the absent case to `#[serde(default)]` as `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for creating a client record.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientCreateRequest {
    /// Sex code: `"M"` or `"F"`.
    pub sexe: String,
    /// Family name.
    pub nom: String,
    /// Given name.
    pub prenom: String,
    /// Date of birth (`YYYY-MM-DD`).
    pub date_naissance: NaiveDate,
    /// Birthplace commune id.
    #[serde(default)]
    pub lieu_naissance: Option<Uuid>,
    /// Residential address.
    pub adresse: String,
    /// National identity card number.
    pub cin: String,
    /// Stored photo reference.
    #[serde(default)]
    pub photo: Option<String>,
}

impl ClientCreateRequest {
    fn into_new_client(self) -> Result<NewClient, AppError> {
        let sex = Sex::parse(&self.sexe).map_err(|e| AppError::Validation(e.to_string()))?;
        let cin = Cin::new(self.cin).map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(NewClient {
            sex,
            last_name: self.nom,
            first_name: self.prenom,
            birth_date: self.date_naissance,
            birthplace: self.lieu_naissance.map(CommuneId::from_uuid),
            address: self.adresse,
            cin,
            photo: self.photo,
        })
    }
}

/// Request body for updating a client record. Absent fields are left
/// unchanged; `lieu_naissance` and `photo` distinguish absent from
/// `null` (null clears).
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ClientUpdateRequest {
    #[serde(default)]
    pub sexe: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub date_naissance: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub lieu_naissance: Option<Option<Uuid>>,
    #[serde(default)]
    pub adresse: Option<String>,
    #[serde(default)]
    pub cin: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub photo: Option<Option<String>>,
    #[serde(default)]
    pub enfants: Option<Vec<Uuid>>,
}

impl ClientUpdateRequest {
    fn into_update(self) -> Result<ClientUpdate, AppError> {
        let sex = self
            .sexe
            .map(|s| Sex::parse(&s))
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let cin = self
            .cin
            .map(Cin::new)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(ClientUpdate {
            sex,
            last_name: self.nom,
            first_name: self.prenom,
            birth_date: self.date_naissance,
            birthplace: self
                .lieu_naissance
                .map(|o| o.map(CommuneId::from_uuid)),
            address: self.adresse,
            cin,
            photo: self.photo,
            children: self
                .enfants
                .map(|ids| ids.into_iter().map(ClientId::from_uuid).collect()),
        })
    }
}

/// Request body for setting a client's spouse.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SpouseRequest {
    /// The partner's client id.
    pub conjoint: Uuid,
}

/// Request body for replacing a client's children set.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChildrenRequest {
    /// The full replacement set of child client ids.
    pub enfants: Vec<Uuid>,
}

/// A client record on the wire.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientResponse {
    pub id: Uuid,
    pub sexe: String,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: NaiveDate,
    pub lieu_naissance: Option<Uuid>,
    pub adresse: String,
    pub cin: String,
    pub photo: Option<String>,
    pub conjoint: Option<Uuid>,
    pub enfants: Vec<Uuid>,
    /// Encoded identity token (base64 PNG). Null for bulk-created
    /// records that have not yet been persisted individually.
    pub qrcode: Option<String>,
    pub date_creation: String,
    pub date_modification: String,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: *client.id.as_uuid(),
            sexe: client.sex.as_str().to_string(),
            nom: client.last_name,
            prenom: client.first_name,
            date_naissance: client.birth_date,
            lieu_naissance: client.birthplace.map(|c| *c.as_uuid()),
            adresse: client.address,
            cin: client.cin.to_string(),
            photo: client.photo,
            conjoint: client.spouse.map(|s| *s.as_uuid()),
            enfants: client.children.iter().map(|c| *c.as_uuid()).collect(),
            qrcode: client.token,
            date_creation: client.created_at.to_iso8601(),
            date_modification: client.updated_at.to_iso8601(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_client(
    State(state): State<AppState>,
    Json(body): Json<ClientCreateRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), AppError> {
    let client = state.registry.create_client(body.into_new_client()?)?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

async fn bulk_create_clients(
    State(state): State<AppState>,
    Json(body): Json<Vec<ClientCreateRequest>>,
) -> Result<(StatusCode, Json<Vec<ClientResponse>>), AppError> {
    let batch = body
        .into_iter()
        .map(ClientCreateRequest::into_new_client)
        .collect::<Result<Vec<_>, _>>()?;
    let clients = state.registry.bulk_create_clients(batch)?;
    Ok((
        StatusCode::CREATED,
        Json(clients.into_iter().map(Into::into).collect()),
    ))
}

async fn list_clients(State(state): State<AppState>) -> Json<Vec<ClientResponse>> {
    Json(
        state
            .registry
            .list_clients()
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientResponse>, AppError> {
    let client = state.registry.get_client(ClientId::from_uuid(id))?;
    Ok(Json(client.into()))
}

async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ClientUpdateRequest>,
) -> Result<Json<ClientResponse>, AppError> {
    let client = state
        .registry
        .update_client(ClientId::from_uuid(id), body.into_update()?)?;
    Ok(Json(client.into()))
}

async fn set_spouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SpouseRequest>,
) -> Result<Json<ClientResponse>, AppError> {
    let (client, _) = state
        .registry
        .set_spouse(ClientId::from_uuid(id), ClientId::from_uuid(body.conjoint))?;
    Ok(Json(client.into()))
}

async fn clear_spouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientResponse>, AppError> {
    let client = state.registry.clear_spouse(ClientId::from_uuid(id))?;
    Ok(Json(client.into()))
}

async fn set_children(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChildrenRequest>,
) -> Result<Json<ClientResponse>, AppError> {
    let children: BTreeSet<ClientId> = body
        .enfants
        .into_iter()
        .map(ClientId::from_uuid)
        .collect();
    let client = state
        .registry
        .set_children(ClientId::from_uuid(id), children)?;
    Ok(Json(client.into()))
}
