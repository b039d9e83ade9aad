//! # Document Request Ledger
//!
//! Append-only record of citizen requests for official documents. The
//! core only ever adds entries and reads them back; status transitions
//! belong to the request-handling collaborator, so the setter here
//! enforces nothing beyond the default initial value.

use serde::{Deserialize, Serialize};

use dgr_core::{ClientId, RequestId, Timestamp, ValidationError};

use crate::error::RegistryError;
use crate::store::Registry;

/// Default status of a freshly created request.
pub const DEFAULT_REQUEST_STATUS: &str = "pending";

/// The kind of official document requested.
///
/// Wire codes are a persistence compatibility contract: they match the
/// persisted column values and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActType {
    /// Acte de naissance.
    #[serde(rename = "naissance")]
    BirthCertificate,
    /// Copie d'acte.
    #[serde(rename = "copie")]
    ActCopy,
    /// Carte d'identité (CIN).
    #[serde(rename = "cin")]
    IdCard,
    /// Acte de mariage.
    #[serde(rename = "mariage")]
    MarriageCertificate,
    /// Légalisation de document.
    #[serde(rename = "legalise")]
    Legalization,
    /// Acte de divorce.
    #[serde(rename = "divorce")]
    DivorceCertificate,
    /// Acte de décès.
    #[serde(rename = "decès")]
    DeathCertificate,
}

impl ActType {
    /// Every document type, in wire-code order.
    pub const ALL: [ActType; 7] = [
        Self::BirthCertificate,
        Self::ActCopy,
        Self::IdCard,
        Self::MarriageCertificate,
        Self::Legalization,
        Self::DivorceCertificate,
        Self::DeathCertificate,
    ];

    /// The persisted wire code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BirthCertificate => "naissance",
            Self::ActCopy => "copie",
            Self::IdCard => "cin",
            Self::MarriageCertificate => "mariage",
            Self::Legalization => "legalise",
            Self::DivorceCertificate => "divorce",
            Self::DeathCertificate => "decès",
        }
    }

    /// Human-readable label, as shown on printed receipts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BirthCertificate => "Acte de naissance",
            Self::ActCopy => "Copie d'acte",
            Self::IdCard => "Carte d'identité (CIN)",
            Self::MarriageCertificate => "Acte de mariage",
            Self::Legalization => "Légalisation de document",
            Self::DivorceCertificate => "Acte de divorce",
            Self::DeathCertificate => "Acte de décès",
        }
    }

    /// Parse a wire code.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == code)
            .ok_or_else(|| ValidationError::InvalidActType(code.to_string()))
    }
}

impl std::fmt::Display for ActType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A citizen's request for an official document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    /// Unique request identifier.
    pub id: RequestId,
    /// The requesting client.
    pub client: ClientId,
    /// The document requested.
    pub act_type: ActType,
    /// When the request was filed.
    pub requested_at: Timestamp,
    /// Processing status. Defaults to [`DEFAULT_REQUEST_STATUS`];
    /// transitions are an external collaborator's responsibility.
    pub status: String,
}

impl Registry {
    /// File a document request for a client.
    ///
    /// Purely additive. `status` defaults to
    /// [`DEFAULT_REQUEST_STATUS`] when not given.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown client.
    pub fn create_document_request(
        &self,
        client: ClientId,
        act_type: ActType,
        status: Option<String>,
    ) -> Result<DocumentRequest, RegistryError> {
        let now = Timestamp::now();
        let mut inner = self.write();
        if !inner.clients.contains_key(&client) {
            return Err(RegistryError::not_found(format!("client {client}")));
        }

        let request = DocumentRequest {
            id: RequestId::new(),
            client,
            act_type,
            requested_at: now,
            status: status.unwrap_or_else(|| DEFAULT_REQUEST_STATUS.to_string()),
        };
        inner.requests.push(request.clone());
        tracing::debug!(request = %request.id, %client, act_type = %act_type, "document request filed");
        Ok(request)
    }

    /// Fetch a request by id.
    pub fn get_document_request(&self, id: RequestId) -> Result<DocumentRequest, RegistryError> {
        self.read()
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("document request {id}")))
    }

    /// The ledger in filing order, optionally filtered to one client.
    pub fn list_document_requests(&self, client: Option<ClientId>) -> Vec<DocumentRequest> {
        self.read()
            .requests
            .iter()
            .filter(|r| client.map_or(true, |c| r.client == c))
            .cloned()
            .collect()
    }

    /// Replace a request's status. Exposed for the request-handling
    /// collaborator; the core enforces no state machine here.
    pub fn set_document_request_status(
        &self,
        id: RequestId,
        status: &str,
    ) -> Result<DocumentRequest, RegistryError> {
        let mut inner = self.write();
        let request = inner
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RegistryError::not_found(format!("document request {id}")))?;
        request.status = status.to_string();
        Ok(request.clone())
    }
}
