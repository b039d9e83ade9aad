//! # Regions and Communes
//!
//! The two-level administrative lookup hierarchy referenced by client
//! records. Regions are effectively immutable once communes reference
//! them; communes optionally carry one administrator account reference,
//! which is nulled — not cascaded — when the account is removed.

use serde::{Deserialize, Serialize};

use dgr_core::{AccountId, CommuneId, RegionId, ValidationError};

use crate::error::RegistryError;
use crate::store::Registry;

/// A named top-level administrative area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Unique region identifier.
    pub id: RegionId,
    /// Region name.
    pub name: String,
}

/// A commune within a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commune {
    /// Unique commune identifier.
    pub id: CommuneId,
    /// Commune name.
    pub name: String,
    /// The region this commune belongs to.
    pub region: RegionId,
    /// Administrator account, when assigned. Nulled if the account is
    /// removed.
    pub admin: Option<AccountId>,
}

/// Input for creating a commune.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommune {
    /// Commune name. Required non-empty.
    pub name: String,
    /// Owning region. Must exist.
    pub region: RegionId,
    /// Initial administrator account, if any. Must exist and carry the
    /// commune-administrator flag.
    pub admin: Option<AccountId>,
}

impl Registry {
    /// Create a region.
    pub fn create_region(&self, name: &str) -> Result<Region, RegistryError> {
        if name.trim().is_empty() {
            return Err(ValidationError::MissingField("nom").into());
        }
        let mut inner = self.write();
        let region = Region {
            id: RegionId::new(),
            name: name.trim().to_string(),
        };
        inner.regions.insert(region.id, region.clone());
        Ok(region)
    }

    /// Fetch a region by id.
    pub fn get_region(&self, id: RegionId) -> Result<Region, RegistryError> {
        self.read()
            .regions
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("region {id}")))
    }

    /// All regions, sorted by name.
    pub fn list_regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = self.read().regions.values().cloned().collect();
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        regions
    }

    /// Create a commune within an existing region.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing region or admin account, `Validation` if
    /// the admin account is not flagged as a commune administrator.
    pub fn create_commune(&self, new: NewCommune) -> Result<Commune, RegistryError> {
        if new.name.trim().is_empty() {
            return Err(ValidationError::MissingField("nom").into());
        }
        let mut inner = self.write();
        if !inner.regions.contains_key(&new.region) {
            return Err(RegistryError::not_found(format!("region {}", new.region)));
        }
        if let Some(admin) = new.admin {
            let account = inner
                .accounts
                .get(&admin)
                .ok_or_else(|| RegistryError::not_found(format!("account {admin}")))?;
            if !account.is_commune_admin {
                return Err(RegistryError::Integrity(format!(
                    "account {admin} is not a commune administrator"
                )));
            }
        }

        let commune = Commune {
            id: CommuneId::new(),
            name: new.name.trim().to_string(),
            region: new.region,
            admin: new.admin,
        };
        inner.communes.insert(commune.id, commune.clone());
        Ok(commune)
    }

    /// Fetch a commune by id.
    pub fn get_commune(&self, id: CommuneId) -> Result<Commune, RegistryError> {
        self.read()
            .communes
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::not_found(format!("commune {id}")))
    }

    /// All communes, sorted by name.
    pub fn list_communes(&self) -> Vec<Commune> {
        let mut communes: Vec<Commune> = self.read().communes.values().cloned().collect();
        communes.sort_by(|a, b| a.name.cmp(&b.name));
        communes
    }

    /// Assign (or replace) a commune's administrator account.
    pub fn assign_commune_admin(
        &self,
        commune: CommuneId,
        admin: AccountId,
    ) -> Result<Commune, RegistryError> {
        let mut inner = self.write();
        let account = inner
            .accounts
            .get(&admin)
            .ok_or_else(|| RegistryError::not_found(format!("account {admin}")))?;
        if !account.is_commune_admin {
            return Err(RegistryError::Integrity(format!(
                "account {admin} is not a commune administrator"
            )));
        }
        let entry = inner
            .communes
            .get_mut(&commune)
            .ok_or_else(|| RegistryError::not_found(format!("commune {commune}")))?;
        entry.admin = Some(admin);
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::NewClient;
    use chrono::NaiveDate;
    use dgr_core::{Cin, Sex};

    fn new_client(cin: &str) -> NewClient {
        NewClient {
            sex: Sex::Male,
            last_name: "Rakoto".to_string(),
            first_name: "Jean".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            birthplace: None,
            address: "Lot II A 23".to_string(),
            cin: Cin::new(cin).unwrap(),
            photo: None,
        }
    }

    #[test]
    fn region_commune_hierarchy() {
        let registry = Registry::new();
        let region = registry.create_region("Analamanga").unwrap();
        let commune = registry
            .create_commune(NewCommune {
                name: "Antananarivo".to_string(),
                region: region.id,
                admin: None,
            })
            .unwrap();
        assert_eq!(commune.region, region.id);
        assert_eq!(registry.get_commune(commune.id).unwrap().name, "Antananarivo");
    }

    #[test]
    fn commune_requires_existing_region() {
        let registry = Registry::new();
        let err = registry
            .create_commune(NewCommune {
                name: "Antananarivo".to_string(),
                region: RegionId::new(),
                admin: None,
            })
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn empty_names_rejected() {
        let registry = Registry::new();
        assert!(registry.create_region("  ").is_err());
        let region = registry.create_region("Analamanga").unwrap();
        assert!(registry
            .create_commune(NewCommune {
                name: String::new(),
                region: region.id,
                admin: None,
            })
            .is_err());
    }

    #[test]
    fn commune_admin_must_be_flagged() {
        let registry = Registry::new();
        let region = registry.create_region("Analamanga").unwrap();
        let commune = registry
            .create_commune(NewCommune {
                name: "Antananarivo".to_string(),
                region: region.id,
                admin: None,
            })
            .unwrap();

        // A client account cannot administer a commune.
        let client = registry.create_client(new_client("CNI000050")).unwrap();
        let client_account = registry.account_for_client(client.id).unwrap();
        assert!(registry
            .assign_commune_admin(commune.id, client_account.id)
            .is_err());

        let admin = registry
            .create_commune_admin("admin", "admin@digitaratasy.mg", "pw")
            .unwrap();
        let updated = registry.assign_commune_admin(commune.id, admin.id).unwrap();
        assert_eq!(updated.admin, Some(admin.id));
    }

    #[test]
    fn account_removal_nulls_commune_admin() {
        let registry = Registry::new();
        let region = registry.create_region("Analamanga").unwrap();
        let admin = registry
            .create_commune_admin("admin", "admin@digitaratasy.mg", "pw")
            .unwrap();
        let commune = registry
            .create_commune(NewCommune {
                name: "Antananarivo".to_string(),
                region: region.id,
                admin: Some(admin.id),
            })
            .unwrap();

        registry.remove_account(admin.id).unwrap();

        // The commune survives; the reference is nulled, not cascaded.
        let stored = registry.get_commune(commune.id).unwrap();
        assert_eq!(stored.admin, None);
    }

    #[test]
    fn list_regions_sorted() {
        let registry = Registry::new();
        registry.create_region("Vakinankaratra").unwrap();
        registry.create_region("Analamanga").unwrap();
        let names: Vec<String> = registry.list_regions().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Analamanga", "Vakinankaratra"]);
    }
}
