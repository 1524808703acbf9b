//! Identity resolution and merge.
//!
//! Each catalog entry is resolved against the local store, first by the SKU
//! the importer assigns (`dummy-<remote id>`), then by exact title among
//! published products. A match is merge-updated, anything else is created.
//!
//! # Merge semantics
//!
//! The merge is additive: stock and price of the remote entry are added to the
//! stored values, so importing an unchanged catalog twice doubles both. The
//! summed price is written to `price` and `regular_price`. `stock_status` is
//! only set when a product is created and is left as-is on update, even when
//! the new quantity would imply a different status.
//!
//! Entries are processed one at a time in source order. A failure on one entry
//! is recorded in the [`ImportSummary`] and does not stop the run. Nothing is
//! rolled back: a product whose metadata writes fail half-way stays as it is.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use product_importer_core::{
    ProductId, ProductKind, ProductStatus, RemoteProductId, Sku, StockStatus,
};

use super::fetcher::{CatalogEntry, MalformedEntry, RemoteProduct};
use super::store::CatalogStore;
use crate::db::RepositoryError;
use crate::models::{NewProduct, ProductMeta};

/// Per-item failure while reconciling one remote product.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] RepositoryError),

    #[error("stock overflow for product {id}: {current} + {incoming}")]
    StockOverflow {
        id: ProductId,
        current: i32,
        incoming: i32,
    },

    #[error("price overflow for product {id}")]
    PriceOverflow { id: ProductId },
}

/// How an existing product was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    Sku,
    Title,
}

/// Result of reconciling a single product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created {
        id: ProductId,
        /// Set when the thumbnail could not be attached.
        image_error: Option<String>,
    },
    Updated {
        id: ProductId,
        matched_by: MatchedBy,
        stock_quantity: i32,
    },
}

/// Category of a per-item failure, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The catalog entry could not be mapped.
    Malformed,
    /// A store operation failed.
    Store,
    /// Merged stock or price does not fit.
    Overflow,
    /// The product was created but its image was not attached.
    Image,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed entry"),
            Self::Store => write!(f, "store error"),
            Self::Overflow => write!(f, "overflow"),
            Self::Image => write!(f, "image not attached"),
        }
    }
}

/// A single entry that did not import cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub remote_id: Option<RemoteProductId>,
    pub kind: FailureKind,
    pub message: String,
}

/// Counts and failures from one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    /// Entries that were neither created nor updated.
    pub skipped: usize,
    /// Created products whose thumbnail could not be attached.
    pub image_failures: usize,
    pub failures: Vec<ItemFailure>,
}

impl ImportSummary {
    /// Total number of catalog entries seen.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.created + self.updated + self.skipped
    }

    fn record_malformed(&mut self, entry: MalformedEntry) {
        self.skipped += 1;
        self.failures.push(ItemFailure {
            remote_id: entry.remote_id,
            kind: FailureKind::Malformed,
            message: format!("entry {}: {}", entry.index, entry.reason),
        });
    }

    fn record(&mut self, remote_id: RemoteProductId, result: Result<Outcome, ReconcileError>) {
        match result {
            Ok(Outcome::Created { image_error, .. }) => {
                self.created += 1;
                if let Some(message) = image_error {
                    self.image_failures += 1;
                    self.failures.push(ItemFailure {
                        remote_id: Some(remote_id),
                        kind: FailureKind::Image,
                        message,
                    });
                }
            }
            Ok(Outcome::Updated { .. }) => self.updated += 1,
            Err(err) => {
                let kind = match &err {
                    ReconcileError::Store(_) => FailureKind::Store,
                    ReconcileError::StockOverflow { .. } | ReconcileError::PriceOverflow { .. } => {
                        FailureKind::Overflow
                    }
                };
                self.skipped += 1;
                self.failures.push(ItemFailure {
                    remote_id: Some(remote_id),
                    kind,
                    message: err.to_string(),
                });
            }
        }
    }
}

/// Reconciles catalog entries into a [`CatalogStore`].
pub struct Reconciler<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> Reconciler<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// Reconcile every entry in order and summarize the run.
    #[instrument(skip_all, fields(entries = entries.len()))]
    pub async fn reconcile(&self, entries: Vec<CatalogEntry>) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for entry in entries {
            match entry {
                CatalogEntry::Product(product) => {
                    let result = self.reconcile_one(&product).await;
                    if let Err(e) = &result {
                        tracing::warn!(
                            remote_id = %product.remote_id,
                            error = %e,
                            "Skipping catalog entry"
                        );
                    }
                    summary.record(product.remote_id, result);
                }
                CatalogEntry::Malformed(entry) => summary.record_malformed(entry),
            }
        }

        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            image_failures = summary.image_failures,
            "Catalog reconciled"
        );

        summary
    }

    /// Reconcile a single remote product.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError` if a store operation fails or the merged values
    /// overflow. Image attach failures are reported in the outcome instead.
    pub async fn reconcile_one(&self, product: &RemoteProduct) -> Result<Outcome, ReconcileError> {
        let sku = Sku::for_remote(product.remote_id);

        match self.resolve(&sku, &product.title).await? {
            Some((id, matched_by)) => self.merge(id, matched_by, product).await,
            None => self.create(sku, product).await,
        }
    }

    async fn resolve(
        &self,
        sku: &Sku,
        title: &str,
    ) -> Result<Option<(ProductId, MatchedBy)>, RepositoryError> {
        if let Some(id) = self.store.find_by_sku(sku).await? {
            return Ok(Some((id, MatchedBy::Sku)));
        }

        Ok(self
            .store
            .find_by_title(title)
            .await?
            .map(|id| (id, MatchedBy::Title)))
    }

    async fn merge(
        &self,
        id: ProductId,
        matched_by: MatchedBy,
        product: &RemoteProduct,
    ) -> Result<Outcome, ReconcileError> {
        let mut local = self.store.load(id).await?;

        let current = local.stock_baseline();
        let stock_quantity = current.checked_add(product.stock_quantity).ok_or(
            ReconcileError::StockOverflow {
                id,
                current,
                incoming: product.stock_quantity,
            },
        )?;
        let price = local
            .price_baseline()
            .checked_add(product.price)
            .ok_or(ReconcileError::PriceOverflow { id })?;

        local.stock_quantity = Some(stock_quantity);
        local.regular_price = Some(price);
        local.price = Some(price);
        self.store.save(&local).await?;

        tracing::info!(
            remote_id = %product.remote_id,
            id = %id,
            matched_by = ?matched_by,
            stock_quantity,
            price = %price,
            "Updated product"
        );

        Ok(Outcome::Updated {
            id,
            matched_by,
            stock_quantity,
        })
    }

    async fn create(&self, sku: Sku, product: &RemoteProduct) -> Result<Outcome, ReconcileError> {
        let id = self
            .store
            .create(&NewProduct {
                title: product.title.clone(),
                description: product.description.clone(),
                status: ProductStatus::Published,
                kind: ProductKind::Simple,
            })
            .await?;

        let metadata = [
            ProductMeta::RegularPrice(product.price),
            ProductMeta::Price(product.price),
            ProductMeta::StockQuantity(product.stock_quantity),
            ProductMeta::StockStatus(StockStatus::from_quantity(product.stock_quantity)),
            ProductMeta::Sku(sku.clone()),
            ProductMeta::ManageStock(true),
        ];
        for meta in &metadata {
            self.store.set_meta(id, meta).await?;
        }

        let image_error = match &product.thumbnail_url {
            Some(url) => match self.store.attach_image(id, url).await {
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(id = %id, url = %url, error = %e, "Failed to attach image");
                    Some(e.to_string())
                }
            },
            None => None,
        };

        tracing::info!(remote_id = %product.remote_id, id = %id, sku = %sku, "Created product");

        Ok(Outcome::Created { id, image_error })
    }
}
