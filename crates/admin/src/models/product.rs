//! Local catalog product models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use product_importer_core::{
    MediaId, Price, ProductId, ProductKind, ProductStatus, Sku, StockStatus,
};

/// A product persisted in the local store.
///
/// Pricing and stock fields are optional because records that were not created
/// by the importer may never have had them set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProduct {
    /// Store-assigned product ID.
    pub id: ProductId,
    /// Stock-keeping unit, unique within the store when present.
    pub sku: Option<Sku>,
    /// Product title (plain text).
    pub title: String,
    /// Product description (rich content, may contain markup).
    pub description: String,
    /// Publication state.
    pub status: ProductStatus,
    /// Product type marker.
    pub kind: ProductKind,
    /// List price.
    pub regular_price: Option<Price>,
    /// Effective selling price.
    pub price: Option<Price>,
    /// Units on hand.
    pub stock_quantity: Option<i32>,
    /// Whether stock is tracked for this product.
    pub manage_stock: bool,
    /// Stock availability. Set at creation by the importer, never recomputed.
    pub stock_status: Option<StockStatus>,
    /// Featured image.
    pub thumbnail_id: Option<MediaId>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl LocalProduct {
    /// A product with only the fields a fresh `create` sets.
    #[must_use]
    pub fn from_new(id: ProductId, input: &NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            sku: None,
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.status,
            kind: input.kind,
            regular_price: None,
            price: None,
            stock_quantity: None,
            manage_stock: false,
            stock_status: None,
            thumbnail_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stock baseline for an additive merge (missing counts as zero).
    #[must_use]
    pub fn stock_baseline(&self) -> i32 {
        self.stock_quantity.unwrap_or(0)
    }

    /// Price baseline for an additive merge (missing counts as zero).
    #[must_use]
    pub fn price_baseline(&self) -> Price {
        self.regular_price.unwrap_or(Price::ZERO)
    }

    /// Apply a single metadata write.
    pub fn apply_meta(&mut self, meta: &ProductMeta) {
        match meta {
            ProductMeta::RegularPrice(price) => self.regular_price = Some(*price),
            ProductMeta::Price(price) => self.price = Some(*price),
            ProductMeta::StockQuantity(quantity) => self.stock_quantity = Some(*quantity),
            ProductMeta::StockStatus(status) => self.stock_status = Some(*status),
            ProductMeta::Sku(sku) => self.sku = Some(sku.clone()),
            ProductMeta::ManageStock(manage) => self.manage_stock = *manage,
        }
    }
}

/// Fields required to create a product record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub status: ProductStatus,
    pub kind: ProductKind,
}

/// A single typed metadata write against an existing product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductMeta {
    RegularPrice(Price),
    Price(Price),
    StockQuantity(i32),
    StockStatus(StockStatus),
    Sku(Sku),
    ManageStock(bool),
}

impl ProductMeta {
    /// Name of the field this write targets, for logging.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::RegularPrice(_) => "regular_price",
            Self::Price(_) => "price",
            Self::StockQuantity(_) => "stock_quantity",
            Self::StockStatus(_) => "stock_status",
            Self::Sku(_) => "sku",
            Self::ManageStock(_) => "manage_stock",
        }
    }
}
