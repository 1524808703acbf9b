//! Catalog import pipeline.
//!
//! One run is a single fetch followed by a sequential reconcile:
//!
//! ```text
//! CatalogClient::fetch_catalog ──► Vec<CatalogEntry> ──► Reconciler::reconcile ──► ImportSummary
//! ```
//!
//! A [`FetchError`] ends the run before the store is touched. Everything after
//! that is per-item and ends up in the summary.
//!
//! Two runs started at the same time are not coordinated and will both apply
//! their increments.

pub mod fetcher;
pub mod markup;
pub mod memory;
pub mod reconciler;
pub mod store;

use tracing::instrument;

pub use fetcher::{CatalogClient, CatalogEntry, EntryError, FetchError, RemoteProduct};
pub use memory::MemoryCatalogStore;
pub use reconciler::{FailureKind, ImportSummary, ItemFailure, Reconciler};
pub use store::CatalogStore;

/// Fetch the remote catalog and reconcile it into `store`.
///
/// # Errors
///
/// Returns `FetchError` if the catalog cannot be fetched or decoded. No store
/// writes happen in that case.
#[instrument(skip_all, fields(url = %client.url()))]
pub async fn run_import(
    client: &CatalogClient,
    store: &dyn CatalogStore,
) -> Result<ImportSummary, FetchError> {
    let entries = client.fetch_catalog().await.inspect_err(|e| {
        tracing::error!(error = %e, "Catalog fetch failed, nothing imported");
    })?;

    Ok(Reconciler::new(store).reconcile(entries).await)
}
