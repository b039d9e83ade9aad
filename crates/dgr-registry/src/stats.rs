//! # Statistics Projection
//!
//! Read-only aggregate counts over registry state, consumed by the
//! reporting layer. Pure projection: one read lock, no mutation, no
//! caching.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::request::ActType;
use crate::store::Registry;

/// Client count for one birthplace commune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuneClientCount {
    /// Commune name.
    pub commune: String,
    /// Clients born there.
    pub count: u64,
}

/// Aggregate counts over the whole registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Total system accounts.
    pub accounts: u64,
    /// Total regions.
    pub regions: u64,
    /// Total communes.
    pub communes: u64,
    /// Total client records.
    pub clients: u64,
    /// Accounts flagged as commune administrators.
    pub commune_admins: u64,
    /// Total document requests.
    pub document_requests: u64,
    /// Requests per document type, keyed by display label. Every type is
    /// present, zero counts included.
    pub requests_by_type: BTreeMap<String, u64>,
    /// Clients grouped by birthplace commune, sorted by commune name.
    pub clients_by_birthplace: Vec<CommuneClientCount>,
}

impl Registry {
    /// Compute the aggregate statistics snapshot.
    pub fn statistics(&self) -> Statistics {
        let inner = self.read();

        let mut requests_by_type: BTreeMap<String, u64> = ActType::ALL
            .iter()
            .map(|t| (t.label().to_string(), 0))
            .collect();
        for request in &inner.requests {
            if let Some(count) = requests_by_type.get_mut(request.act_type.label()) {
                *count += 1;
            }
        }

        let mut clients_by_birthplace: Vec<CommuneClientCount> = inner
            .communes
            .values()
            .map(|commune| CommuneClientCount {
                commune: commune.name.clone(),
                count: inner
                    .clients
                    .values()
                    .filter(|c| c.birthplace == Some(commune.id))
                    .count() as u64,
            })
            .collect();
        clients_by_birthplace.sort_by(|a, b| a.commune.cmp(&b.commune));

        Statistics {
            accounts: inner.accounts.len() as u64,
            regions: inner.regions.len() as u64,
            communes: inner.communes.len() as u64,
            clients: inner.clients.len() as u64,
            commune_admins: inner
                .accounts
                .values()
                .filter(|a| a.is_commune_admin)
                .count() as u64,
            document_requests: inner.requests.len() as u64,
            requests_by_type,
            clients_by_birthplace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::NewClient;
    use crate::geo::NewCommune;
    use chrono::NaiveDate;
    use dgr_core::{Cin, CommuneId, Sex};

    fn new_client(cin: &str, birthplace: Option<CommuneId>) -> NewClient {
        NewClient {
            sex: Sex::Male,
            last_name: "Rakoto".to_string(),
            first_name: "Jean".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            birthplace,
            address: "Lot II A 23".to_string(),
            cin: Cin::new(cin).unwrap(),
            photo: None,
        }
    }

    #[test]
    fn empty_registry_statistics() {
        let registry = Registry::new();
        let stats = registry.statistics();
        assert_eq!(stats.clients, 0);
        assert_eq!(stats.accounts, 0);
        // All seven types present with zero counts.
        assert_eq!(stats.requests_by_type.len(), 7);
        assert!(stats.requests_by_type.values().all(|&c| c == 0));
    }

    #[test]
    fn counts_reflect_state() {
        let registry = Registry::new();
        let region = registry.create_region("Analamanga").unwrap();
        let commune = registry
            .create_commune(NewCommune {
                name: "Antananarivo".to_string(),
                region: region.id,
                admin: None,
            })
            .unwrap();
        registry
            .create_commune_admin("admin", "admin@digitaratasy.mg", "pw")
            .unwrap();

        let a = registry
            .create_client(new_client("CNI000001", Some(commune.id)))
            .unwrap();
        registry
            .create_client(new_client("CNI000002", None))
            .unwrap();
        registry
            .create_document_request(a.id, ActType::BirthCertificate, None)
            .unwrap();
        registry
            .create_document_request(a.id, ActType::BirthCertificate, None)
            .unwrap();

        let stats = registry.statistics();
        assert_eq!(stats.regions, 1);
        assert_eq!(stats.communes, 1);
        assert_eq!(stats.clients, 2);
        assert_eq!(stats.commune_admins, 1);
        // Two client accounts were provisioned plus the admin.
        assert_eq!(stats.accounts, 3);
        assert_eq!(stats.document_requests, 2);
        assert_eq!(stats.requests_by_type["Acte de naissance"], 2);
        assert_eq!(stats.requests_by_type["Acte de mariage"], 0);
        assert_eq!(
            stats.clients_by_birthplace,
            vec![CommuneClientCount {
                commune: "Antananarivo".to_string(),
                count: 1
            }]
        );
    }
}
