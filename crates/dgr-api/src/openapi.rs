//! # OpenAPI Schema Export
//!
//! Serves the component schemas of the API's typed contracts at
//! `/openapi.json` for client generators and the operator console.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::{ErrorBody, ErrorDetail};
use crate::routes::accounts::{
    AccountResponse, AdminCommuneCreateRequest, ChangePasswordRequest, ForgotPasswordRequest,
    ResetOutcomeResponse, ResetPasswordRequest,
};
use crate::routes::clients::{
    ChildrenRequest, ClientCreateRequest, ClientResponse, ClientUpdateRequest, SpouseRequest,
};
use crate::routes::geo::{
    AdminAssignRequest, CommuneCreateRequest, CommuneResponse, RegionCreateRequest, RegionResponse,
};
use crate::routes::requests::{DemandeCreateRequest, DemandeResponse, StatusUpdateRequest};
use crate::state::AppState;

/// The OpenAPI document: component schemas for every wire contract.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Digitaratasy API",
        description = "Civil-registry backend: clients, family relationships, identity tokens, document requests."
    ),
    components(schemas(
        ClientCreateRequest,
        ClientUpdateRequest,
        ClientResponse,
        SpouseRequest,
        ChildrenRequest,
        DemandeCreateRequest,
        DemandeResponse,
        StatusUpdateRequest,
        RegionCreateRequest,
        RegionResponse,
        CommuneCreateRequest,
        CommuneResponse,
        AdminAssignRequest,
        AdminCommuneCreateRequest,
        AccountResponse,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        ResetOutcomeResponse,
        ChangePasswordRequest,
        ErrorBody,
        ErrorDetail,
    ))
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_contains_core_schemas() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("ClientCreateRequest"));
        assert!(json.contains("DemandeResponse"));
        assert!(json.contains("ErrorBody"));
    }
}
