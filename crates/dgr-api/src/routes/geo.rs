//! # Region and Commune Routes
//!
//! Lookup-hierarchy surface: straightforward create/list/retrieve over
//! flat records, plus commune administrator assignment.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use dgr_core::{AccountId, CommuneId, RegionId};
use dgr_registry::{Commune, NewCommune, Region};

use crate::error::AppError;
use crate::state::AppState;

/// Build the region/commune router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/regions", post(create_region).get(list_regions))
        .route("/v1/regions/:id", get(get_region))
        .route("/v1/communes", post(create_commune).get(list_communes))
        .route("/v1/communes/:id", get(get_commune))
        .route("/v1/communes/:id/admin", put(assign_admin))
}

/// Request body for creating a region.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegionCreateRequest {
    /// Region name.
    pub nom: String,
}

/// A region on the wire.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegionResponse {
    pub id: Uuid,
    pub nom: String,
}

impl From<Region> for RegionResponse {
    fn from(region: Region) -> Self {
        Self {
            id: *region.id.as_uuid(),
            nom: region.name,
        }
    }
}

/// Request body for creating a commune.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommuneCreateRequest {
    /// Commune name.
    pub nom: String,
    /// Owning region id.
    pub region: Uuid,
    /// Administrator account id, if assigned at creation.
    #[serde(default)]
    pub admin_commune: Option<Uuid>,
}

/// Request body for assigning a commune administrator.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminAssignRequest {
    /// The administrator account id.
    pub admin_commune: Uuid,
}

/// A commune on the wire.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommuneResponse {
    pub id: Uuid,
    pub nom: String,
    pub region: Uuid,
    pub admin_commune: Option<Uuid>,
}

impl From<Commune> for CommuneResponse {
    fn from(commune: Commune) -> Self {
        Self {
            id: *commune.id.as_uuid(),
            nom: commune.name,
            region: *commune.region.as_uuid(),
            admin_commune: commune.admin.map(|a| *a.as_uuid()),
        }
    }
}

async fn create_region(
    State(state): State<AppState>,
    Json(body): Json<RegionCreateRequest>,
) -> Result<(StatusCode, Json<RegionResponse>), AppError> {
    let region = state.registry.create_region(&body.nom)?;
    Ok((StatusCode::CREATED, Json(region.into())))
}

async fn list_regions(State(state): State<AppState>) -> Json<Vec<RegionResponse>> {
    Json(
        state
            .registry
            .list_regions()
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

async fn get_region(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RegionResponse>, AppError> {
    let region = state.registry.get_region(RegionId::from_uuid(id))?;
    Ok(Json(region.into()))
}

async fn create_commune(
    State(state): State<AppState>,
    Json(body): Json<CommuneCreateRequest>,
) -> Result<(StatusCode, Json<CommuneResponse>), AppError> {
    let commune = state.registry.create_commune(NewCommune {
        name: body.nom,
        region: RegionId::from_uuid(body.region),
        admin: body.admin_commune.map(AccountId::from_uuid),
    })?;
    Ok((StatusCode::CREATED, Json(commune.into())))
}

async fn list_communes(State(state): State<AppState>) -> Json<Vec<CommuneResponse>> {
    Json(
        state
            .registry
            .list_communes()
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

async fn get_commune(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommuneResponse>, AppError> {
    let commune = state.registry.get_commune(CommuneId::from_uuid(id))?;
    Ok(Json(commune.into()))
}

async fn assign_admin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AdminAssignRequest>,
) -> Result<Json<CommuneResponse>, AppError> {
    let commune = state.registry.assign_commune_admin(
        CommuneId::from_uuid(id),
        AccountId::from_uuid(body.admin_commune),
    )?;
    Ok(Json(commune.into()))
}
