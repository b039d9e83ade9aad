//! # Data Seeding
//!
//! Generates realistic client records through the normal creation path
//! (tokens and accounts included), then wires couples and children so
//! the family graph has something to traverse. Region/commune fixtures
//! cover the six provincial capitals.

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use dgr_core::{Cin, CommuneId, Sex};
use dgr_registry::{NewClient, NewCommune, Registry};

/// Arguments for `dgr seed`.
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Number of base client records to create.
    #[arg(long, default_value_t = 1000)]
    pub count: usize,

    /// Skip couple/children wiring and only create base records.
    #[arg(long)]
    pub no_families: bool,

    /// RNG seed for reproducible data sets.
    #[arg(long, default_value_t = 42)]
    pub rng_seed: u64,
}

/// What a seeding run produced.
#[derive(Debug, Serialize)]
pub struct SeedSummary {
    pub clients: usize,
    pub accounts: usize,
    pub couples: usize,
    pub children: usize,
    pub communes: usize,
}

const CAPITAL_COMMUNES: [&str; 6] = [
    "Antananarivo",
    "Toamasina",
    "Fianarantsoa",
    "Mahajanga",
    "Toliara",
    "Antsiranana",
];

/// Populate `registry` with `count` clients plus family wiring.
///
/// Base records go through the individual creation path, so every one
/// carries a token and a provisioned account.
pub fn seed_registry(
    registry: &Registry,
    count: usize,
    with_families: bool,
    rng: &mut StdRng,
) -> anyhow::Result<SeedSummary> {
    // Region/commune fixtures.
    let mut communes: Vec<CommuneId> = Vec::with_capacity(CAPITAL_COMMUNES.len());
    for name in CAPITAL_COMMUNES {
        let region = registry.create_region(name)?;
        let commune = registry.create_commune(NewCommune {
            name: name.to_string(),
            region: region.id,
            admin: None,
        })?;
        communes.push(commune.id);
    }

    let epoch = NaiveDate::from_ymd_opt(1990, 1, 1).context("valid epoch date")?;
    let mut males = Vec::new();
    let mut females = Vec::new();

    for i in 1..=count {
        let sex = if rng.gen_bool(0.5) { Sex::Male } else { Sex::Female };
        let (first, last) = match sex {
            Sex::Male => (format!("Jean{i}"), "Rakoto".to_string()),
            Sex::Female => (format!("Jeanne{i}"), "Rakotova".to_string()),
        };
        let birthplace = communes[rng.gen_range(0..communes.len())];
        let client = registry.create_client(NewClient {
            sex,
            last_name: last,
            first_name: first,
            birth_date: epoch + Duration::days(rng.gen_range(1..365 * 30)),
            birthplace: Some(birthplace),
            address: format!("Adresse {i}"),
            cin: Cin::new(format!("CNI{i:06}"))?,
            photo: None,
        })?;
        match sex {
            Sex::Male => males.push(client),
            Sex::Female => females.push(client),
        }
    }

    let mut couples = 0;
    let mut children = 0;
    if with_families {
        let child_epoch = NaiveDate::from_ymd_opt(2010, 1, 1).context("valid epoch date")?;
        for (i, (husband, wife)) in males.iter().zip(females.iter()).enumerate() {
            // Pair up half of the matched couples.
            if i % 2 == 1 {
                continue;
            }
            registry.set_spouse(husband.id, wife.id)?;
            couples += 1;

            for n in 0..rng.gen_range(1..=3usize) {
                let sex = if rng.gen_bool(0.5) { Sex::Male } else { Sex::Female };
                let child = registry.create_client(NewClient {
                    sex,
                    last_name: husband.last_name.clone(),
                    first_name: format!("Enfant{}", n + 1),
                    birth_date: child_epoch + Duration::days(rng.gen_range(1..365 * 10)),
                    birthplace: None,
                    address: husband.address.clone(),
                    cin: Cin::new(format!("ENF{i:06}{n}"))?,
                    photo: None,
                })?;
                registry.add_child(husband.id, child.id)?;
                registry.add_child(wife.id, child.id)?;
                children += 1;
            }
        }
    }

    Ok(SeedSummary {
        clients: registry.client_count(),
        accounts: registry.list_accounts().len(),
        couples,
        children,
        communes: communes.len(),
    })
}

/// Run `dgr seed`: populate a fresh registry and print the summary.
pub fn run_seed(args: &SeedArgs) -> anyhow::Result<()> {
    let registry = Registry::new();
    let mut rng = StdRng::seed_from_u64(args.rng_seed);

    let summary = seed_registry(&registry, args.count, !args.no_families, &mut rng)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_creates_clients_with_side_effects() {
        let registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(7);
        let summary = seed_registry(&registry, 10, true, &mut rng).unwrap();

        assert!(summary.clients >= 10);
        // Every record went through the individual path: one account each.
        assert_eq!(summary.accounts, summary.clients);
        assert_eq!(summary.communes, 6);
    }

    #[test]
    fn seeded_couples_are_symmetric() {
        let registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(7);
        seed_registry(&registry, 20, true, &mut rng).unwrap();

        for client in registry.list_clients() {
            if let Some(spouse) = client.spouse {
                let partner = registry.get_client(spouse).unwrap();
                assert_eq!(partner.spouse, Some(client.id));
            }
        }
    }

    #[test]
    fn seeded_children_have_at_most_two_parents() {
        let registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(7);
        seed_registry(&registry, 20, true, &mut rng).unwrap();

        for client in registry.list_clients() {
            assert!(registry.parents_of(client.id).unwrap().len() <= 2);
        }
    }

    #[test]
    fn no_families_flag_skips_wiring() {
        let registry = Registry::new();
        let mut rng = StdRng::seed_from_u64(7);
        let summary = seed_registry(&registry, 10, false, &mut rng).unwrap();
        assert_eq!(summary.couples, 0);
        assert_eq!(summary.children, 0);
        assert_eq!(summary.clients, 10);
    }
}
