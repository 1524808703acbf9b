//! Catalog import command.
//!
//! Runs the same pipeline as the admin import page and logs the summary.
//! Exits non-zero only when the catalog cannot be fetched; per-item failures
//! are logged and counted.

use std::sync::Arc;

use tracing::{info, warn};

use product_importer_admin::config::{
    CatalogConfig, ConfigError, DEFAULT_CATALOG_URL, parse_catalog_url,
};
use product_importer_admin::db::{self, PgCatalogStore};
use product_importer_admin::importer::{
    CatalogClient, CatalogStore, FetchError, ImportSummary, MemoryCatalogStore, run_import,
};

/// Errors that abort the import command.
#[derive(Debug, thiserror::Error)]
pub enum ImportCommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Import the remote catalog.
///
/// # Arguments
///
/// * `catalog_url` - Endpoint override; falls back to `CATALOG_URL`, then the default
/// * `dry_run` - Reconcile into an empty in-memory store instead of the database
///
/// # Errors
///
/// Returns `ImportCommandError` if configuration is invalid, the database
/// cannot be reached, or the catalog cannot be fetched.
pub async fn run(catalog_url: Option<&str>, dry_run: bool) -> Result<(), ImportCommandError> {
    dotenvy::dotenv().ok();

    let raw_url = catalog_url.map_or_else(
        || std::env::var("CATALOG_URL").unwrap_or_else(|_| DEFAULT_CATALOG_URL.to_string()),
        str::to_string,
    );
    let config = CatalogConfig::new(parse_catalog_url(&raw_url)?);
    let client = CatalogClient::new(&config)?;

    let store: Arc<dyn CatalogStore> = if dry_run {
        info!("Dry run: reconciling into an empty in-memory store");
        Arc::new(MemoryCatalogStore::new())
    } else {
        let database_url = super::database_url()
            .ok_or(ImportCommandError::MissingEnvVar("ADMIN_DATABASE_URL"))?;
        let pool = db::create_pool(&database_url).await?;
        info!("Connected to database");
        Arc::new(PgCatalogStore::new(pool, client.http()))
    };

    info!(url = %client.url(), "Starting import");
    let summary = run_import(&client, store.as_ref()).await?;
    log_summary(&summary);

    Ok(())
}

fn log_summary(summary: &ImportSummary) {
    for failure in &summary.failures {
        warn!(
            remote_id = ?failure.remote_id.map(|id| id.get()),
            kind = %failure.kind,
            "{}",
            failure.message
        );
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        image_failures = summary.image_failures,
        "Import complete"
    );
}
