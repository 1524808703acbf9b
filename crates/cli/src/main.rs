//! Product importer CLI - database migrations and catalog import.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pi-cli migrate
//!
//! # Import the remote catalog into the local store
//! pi-cli import
//!
//! # Import from another endpoint
//! pi-cli import --catalog-url http://127.0.0.1:8080/products
//!
//! # Fetch and reconcile against an empty in-memory store (no database writes)
//! pi-cli import --dry-run
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `import` - Fetch the remote catalog and reconcile it

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pi-cli")]
#[command(author, version, about = "Product importer CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Fetch the remote catalog and reconcile it into the local store
    Import {
        /// Catalog endpoint (overrides `CATALOG_URL`)
        #[arg(long)]
        catalog_url: Option<String>,

        /// Reconcile against an empty in-memory store instead of the database
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Import {
            catalog_url,
            dry_run,
        } => {
            commands::import::run(catalog_url.as_deref(), dry_run).await?;
        }
    }
    Ok(())
}
