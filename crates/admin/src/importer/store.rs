//! Store capability the reconciler writes through.
//!
//! The reconciler never talks to a database directly; it is handed a
//! `CatalogStore` and only uses the operations below. [`PgCatalogStore`] is the
//! production implementation, [`MemoryCatalogStore`] backs tests and dry runs.
//!
//! [`PgCatalogStore`]: crate::db::PgCatalogStore
//! [`MemoryCatalogStore`]: super::MemoryCatalogStore

use async_trait::async_trait;
use url::Url;

use product_importer_core::{MediaId, ProductId, Sku};

use crate::db::RepositoryError;
use crate::models::{LocalProduct, NewProduct, ProductMeta};

/// Persistence operations required by the reconciler.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Find a non-trashed product by exact SKU.
    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<ProductId>, RepositoryError>;

    /// Find the first published product (lowest ID) with exactly this title.
    async fn find_by_title(&self, title: &str) -> Result<Option<ProductId>, RepositoryError>;

    /// Load a product.
    ///
    /// Returns `RepositoryError::NotFound` if it does not exist.
    async fn load(&self, id: ProductId) -> Result<LocalProduct, RepositoryError>;

    /// Create a product record and return its ID.
    async fn create(&self, product: &NewProduct) -> Result<ProductId, RepositoryError>;

    /// Persist every field of an existing product.
    async fn save(&self, product: &LocalProduct) -> Result<(), RepositoryError>;

    /// Write a single metadata field on an existing product.
    async fn set_meta(&self, id: ProductId, meta: &ProductMeta) -> Result<(), RepositoryError>;

    /// Download `url` and attach it as the product's featured image.
    async fn attach_image(&self, id: ProductId, url: &Url) -> Result<MediaId, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
