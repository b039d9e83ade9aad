//! # dgr CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dgr_cli::seed::{run_seed, SeedArgs};
use dgr_cli::serve::{run_serve, ServeArgs};
use dgr_cli::token::{run_token, TokenArgs};

/// Digitaratasy civil-registry CLI.
///
/// Runs the registry API service, seeds realistic data sets, and renders
/// identity tokens for inspection.
#[derive(Parser, Debug)]
#[command(name = "dgr", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the registry API service.
    Serve(ServeArgs),

    /// Generate realistic client records with family relationships.
    Seed(SeedArgs),

    /// Render an identity token for ad-hoc field values.
    Token(TokenArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => run_serve(&args),
        Commands::Seed(args) => run_seed(&args),
        Commands::Token(args) => run_token(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
