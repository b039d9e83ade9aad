//! # Ad-hoc Token Rendering
//!
//! Encodes an identity token from command-line field values — the same
//! deterministic pipeline the registry runs on persist. Useful for
//! verifying scanners and comparing stored tokens against expected
//! bytes.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;

use dgr_token::TokenPayload;

/// Arguments for `dgr token`.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Family name.
    #[arg(long)]
    pub nom: String,

    /// Given name.
    #[arg(long)]
    pub prenom: String,

    /// Date of birth (YYYY-MM-DD).
    #[arg(long)]
    pub date_naissance: NaiveDate,

    /// Birthplace commune name.
    #[arg(long)]
    pub lieu_naissance: Option<String>,

    /// Write the PNG image here instead of printing base64.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Run `dgr token`.
pub fn run_token(args: &TokenArgs) -> anyhow::Result<()> {
    let payload = TokenPayload::new(
        args.nom.clone(),
        args.prenom.clone(),
        args.date_naissance,
        args.lieu_naissance.clone(),
    );
    let token = dgr_token::encode(&payload).context("encoding identity token")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &token.image)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = token.image.len(), "token image written");
        }
        None => println!("{}", token.base64),
    }
    Ok(())
}
