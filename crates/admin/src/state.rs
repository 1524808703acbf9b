//! Application state shared across handlers.

use std::sync::Arc;

use crate::importer::{CatalogClient, CatalogStore};

/// Application state shared across all handlers.
///
/// Cheap to clone (wraps an `Arc`).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: CatalogClient,
    store: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Create application state from a catalog client and a store.
    #[must_use]
    pub fn new(catalog: CatalogClient, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { catalog, store }),
        }
    }

    /// Get the remote catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get the local catalog store.
    #[must_use]
    pub fn store(&self) -> &dyn CatalogStore {
        self.inner.store.as_ref()
    }
}
