//! GitHub Sync - token issuance and repository reconciliation CLI
//!
//! `ghsync auth` mints a short-lived installation access token from the
//! encrypted App key and parks it for the next command. `ghsync sync` drives
//! a declared repository list onto local paths, minting a token inline when
//! none is parked.

#![forbid(unsafe_code)]

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "ghsync")]
#[command(author, version, about = "GitHub App token issuance and repository sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint an installation access token and park it for `sync`
    Auth {
        /// Write the token to this path instead of the default handoff slot
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the token to stdout instead of parking it
        #[arg(long)]
        print: bool,
    },

    /// Reconcile the declared repository list onto local paths
    Sync {
        /// Repository list, one `owner/name [destination]` per line
        #[arg(env = "GHSYNC_REPOS_FILE", default_value = "repos.txt")]
        repos_file: PathBuf,

        /// Directory for records that do not declare a destination
        #[arg(env = "GHSYNC_DEFAULT_DESTINATION", default_value = "./repositories")]
        default_destination: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Auth { output, print } => commands::auth::run(output, print),
        Commands::Sync {
            repos_file,
            default_destination,
        } => commands::sync::run(&repos_file, &default_destination),
    }
}
