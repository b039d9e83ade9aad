//! # API Server Bootstrap
//!
//! Builds the registry, optionally seeds it, and runs the Axum service
//! until interrupted.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use dgr_api::{ApiConfig, AppState};
use dgr_registry::{Registry, RegistryConfig};

use crate::seed::seed_registry;

/// Arguments for `dgr serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:8742")]
    pub addr: String,

    /// Static bearer token protecting the API. Unset disables auth.
    #[arg(long)]
    pub auth_token: Option<String>,

    /// Pre-seed the registry with this many clients (plus families).
    #[arg(long)]
    pub seed: Option<usize>,

    /// Enforce the spouse sex-difference policy.
    #[arg(long)]
    pub enforce_spouse_sex: bool,
}

/// Run `dgr serve`.
pub fn run_serve(args: &ServeArgs) -> anyhow::Result<()> {
    let registry = Arc::new(Registry::with_config(RegistryConfig {
        enforce_spouse_sex_difference: args.enforce_spouse_sex,
    }));

    if let Some(count) = args.seed {
        let mut rng = StdRng::seed_from_u64(42);
        let summary = seed_registry(&registry, count, true, &mut rng)?;
        tracing::info!(
            clients = summary.clients,
            accounts = summary.accounts,
            "registry pre-seeded"
        );
    }

    let state = AppState::new(
        registry,
        ApiConfig {
            auth_token: args.auth_token.clone(),
        },
    );
    let app = dgr_api::app(state);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(async {
        let listener = tokio::net::TcpListener::bind(&args.addr)
            .await
            .with_context(|| format!("binding {}", args.addr))?;
        tracing::info!(addr = %args.addr, "registry API listening");
        axum::serve(listener, app).await.context("serving API")
    })
}
