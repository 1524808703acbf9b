//! In-memory catalog store.
//!
//! Mirrors the lookup rules of the `PostgreSQL` store (SKU match skips trashed
//! products, title match only sees published ones, lowest ID wins) without a
//! database. Used by tests and by `pi-cli import --dry-run`.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use url::Url;

use product_importer_core::{MediaId, ProductId, ProductStatus, Sku};

use super::CatalogStore;
use crate::db::RepositoryError;
use crate::models::{LocalProduct, NewProduct, ProductMeta};

#[derive(Default)]
struct State {
    products: BTreeMap<ProductId, LocalProduct>,
    media: BTreeMap<MediaId, Url>,
    next_product: i32,
    next_media: i32,
    writes: usize,
    rejected_images: HashSet<Url>,
    failing_titles: HashSet<String>,
}

impl State {
    fn product_mut(&mut self, id: ProductId) -> Result<&mut LocalProduct, RepositoryError> {
        self.products.get_mut(&id).ok_or(RepositoryError::NotFound)
    }

    /// Live products must not share a SKU.
    fn check_sku(&self, id: ProductId, sku: &Sku) -> Result<(), RepositoryError> {
        let taken = self.products.values().any(|p| {
            p.id != id && p.status != ProductStatus::Trash && p.sku.as_ref() == Some(sku)
        });
        if taken {
            return Err(RepositoryError::Conflict(format!("sku '{sku}' already exists")));
        }
        Ok(())
    }
}

/// Catalog store kept entirely in memory.
#[derive(Default)]
pub struct MemoryCatalogStore {
    state: Mutex<State>,
}

impl MemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product as-is, keeping its ID.
    pub async fn insert(&self, product: LocalProduct) {
        let mut state = self.state.lock().await;
        state.next_product = state.next_product.max(product.id.get());
        state.products.insert(product.id, product);
    }

    /// All products ordered by ID.
    pub async fn products(&self) -> Vec<LocalProduct> {
        self.state.lock().await.products.values().cloned().collect()
    }

    pub async fn get(&self, id: ProductId) -> Option<LocalProduct> {
        self.state.lock().await.products.get(&id).cloned()
    }

    /// Number of successful write operations so far.
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.writes
    }

    /// Make `attach_image` fail for `url`.
    pub async fn reject_image(&self, url: Url) {
        self.state.lock().await.rejected_images.insert(url);
    }

    /// Make `create` fail for products titled `title`.
    pub async fn fail_creates_for_title(&self, title: &str) {
        self.state.lock().await.failing_titles.insert(title.to_string());
    }

    /// Source URL of an attached image.
    pub async fn media_url(&self, id: MediaId) -> Option<Url> {
        self.state.lock().await.media.get(&id).cloned()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<ProductId>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .values()
            .find(|p| p.status != ProductStatus::Trash && p.sku.as_ref() == Some(sku))
            .map(|p| p.id))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<ProductId>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .values()
            .find(|p| p.status == ProductStatus::Published && p.title == title)
            .map(|p| p.id))
    }

    async fn load(&self, id: ProductId) -> Result<LocalProduct, RepositoryError> {
        let state = self.state.lock().await;
        state.products.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn create(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.failing_titles.contains(&product.title) {
            return Err(RepositoryError::Conflict(format!(
                "cannot create '{}'",
                product.title
            )));
        }

        state.next_product += 1;
        let id = ProductId::new(state.next_product);
        state
            .products
            .insert(id, LocalProduct::from_new(id, product, Utc::now()));
        state.writes += 1;
        Ok(id)
    }

    async fn save(&self, product: &LocalProduct) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        if let Some(sku) = &product.sku {
            state.check_sku(product.id, sku)?;
        }

        let stored = state.product_mut(product.id)?;
        *stored = LocalProduct {
            updated_at: Utc::now(),
            ..product.clone()
        };
        state.writes += 1;
        Ok(())
    }

    async fn set_meta(&self, id: ProductId, meta: &ProductMeta) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        if let ProductMeta::Sku(sku) = meta {
            state.check_sku(id, sku)?;
        }

        let stored = state.product_mut(id)?;
        stored.apply_meta(meta);
        stored.updated_at = Utc::now();
        state.writes += 1;
        Ok(())
    }

    async fn attach_image(&self, id: ProductId, url: &Url) -> Result<MediaId, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.rejected_images.contains(url) {
            return Err(RepositoryError::Media(format!("HTTP 404 for {url}")));
        }
        if !state.products.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }

        state.next_media += 1;
        let media_id = MediaId::new(state.next_media);
        state.media.insert(media_id, url.clone());
        state.product_mut(id)?.thumbnail_id = Some(media_id);
        state.writes += 1;
        Ok(media_id)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use product_importer_core::ProductKind;

    use super::*;

    fn new_product(title: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: String::new(),
            status: ProductStatus::Published,
            kind: ProductKind::Simple,
        }
    }

    #[tokio::test]
    async fn test_ids_continue_after_seeded_products() {
        let store = MemoryCatalogStore::new();
        let seeded = LocalProduct::from_new(ProductId::new(41), &new_product("Seed"), Utc::now());
        store.insert(seeded).await;

        let id = store.create(&new_product("Fresh")).await.unwrap();
        assert_eq!(id, ProductId::new(42));
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn test_live_sku_conflict() {
        let store = MemoryCatalogStore::new();
        let a = store.create(&new_product("A")).await.unwrap();
        let b = store.create(&new_product("B")).await.unwrap();
        let sku = Sku::parse("dummy-1").unwrap();

        store.set_meta(a, &ProductMeta::Sku(sku.clone())).await.unwrap();
        let err = store.set_meta(b, &ProductMeta::Sku(sku)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let store = MemoryCatalogStore::new();
        let err = store.load(ProductId::new(1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert!(
            store
                .set_meta(ProductId::new(1), &ProductMeta::ManageStock(true))
                .await
                .is_err()
        );
        assert_eq!(store.write_count().await, 0);
    }
}
