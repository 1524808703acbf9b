//! `PostgreSQL` catalog store.
//!
//! Implements [`CatalogStore`] on top of the `catalog` schema. Images are
//! sideloaded: the source URL is downloaded once and the bytes are stored in
//! `catalog.media`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use sqlx::PgPool;
use tracing::instrument;
use url::Url;

use product_importer_core::{
    MediaId, Price, ProductId, ProductKind, ProductStatus, Sku, StockStatus,
};

use super::RepositoryError;
use crate::importer::CatalogStore;
use crate::models::{LocalProduct, NewProduct, ProductMeta};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    sku: Option<Sku>,
    title: String,
    description: String,
    status: ProductStatus,
    kind: ProductKind,
    regular_price: Option<Price>,
    price: Option<Price>,
    stock_quantity: Option<i32>,
    manage_stock: bool,
    stock_status: Option<StockStatus>,
    thumbnail_id: Option<MediaId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for LocalProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            sku: row.sku,
            title: row.title,
            description: row.description,
            status: row.status,
            kind: row.kind,
            regular_price: row.regular_price,
            price: row.price,
            stock_quantity: row.stock_quantity,
            manage_stock: row.manage_stock,
            stock_status: row.stock_status,
            thumbnail_id: row.thumbnail_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Largest image body accepted for sideloading.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// `PostgreSQL`-backed catalog store.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
    http: reqwest::Client,
}

impl PgCatalogStore {
    /// Create a new store over `pool`, using `http` to download images.
    #[must_use]
    pub const fn new(pool: PgPool, http: reqwest::Client) -> Self {
        Self { pool, http }
    }

    /// Download an image, requiring a 2xx response with an `image/*` content type
    /// and at most [`MAX_IMAGE_BYTES`] of body.
    async fn download_image(&self, url: &Url) -> Result<(String, Vec<u8>), RepositoryError> {
        let mut response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RepositoryError::Media(e.to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.starts_with("image/") {
            return Err(RepositoryError::Media(format!(
                "unexpected content type '{content_type}' for {url}"
            )));
        }

        let too_large =
            || RepositoryError::Media(format!("image larger than {MAX_IMAGE_BYTES} bytes: {url}"));

        if let Some(length) = response.content_length()
            && length > MAX_IMAGE_BYTES
        {
            return Err(too_large());
        }

        // Content-Length may be absent, so the cap is also enforced while reading.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RepositoryError::Media(e.to_string()))?
        {
            let total = u64::try_from(bytes.len() + chunk.len()).unwrap_or(u64::MAX);
            if total > MAX_IMAGE_BYTES {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok((content_type, bytes))
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self), fields(sku = %sku))]
    async fn find_by_sku(&self, sku: &Sku) -> Result<Option<ProductId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            SELECT id FROM catalog.product
            WHERE sku = $1 AND status <> 'trash'
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn find_by_title(&self, title: &str) -> Result<Option<ProductId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            SELECT id FROM catalog.product
            WHERE title = $1 AND status = 'published'
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn load(&self, id: ProductId) -> Result<LocalProduct, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT
                id, sku, title, description, status, kind,
                regular_price, price, stock_quantity, manage_stock, stock_status,
                thumbnail_id, created_at, updated_at
            FROM catalog.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LocalProduct::from).ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self, product), fields(title = %product.title))]
    async fn create(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            r"
            INSERT INTO catalog.product (title, description, status, kind)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.status)
        .bind(product.kind)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        Ok(id)
    }

    #[instrument(skip(self, product), fields(id = %product.id))]
    async fn save(&self, product: &LocalProduct) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE catalog.product SET
                sku = $2,
                title = $3,
                description = $4,
                status = $5,
                kind = $6,
                regular_price = $7,
                price = $8,
                stock_quantity = $9,
                manage_stock = $10,
                stock_status = $11,
                thumbnail_id = $12,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(product.id)
        .bind(product.sku.as_ref())
        .bind(&product.title)
        .bind(&product.description)
        .bind(product.status)
        .bind(product.kind)
        .bind(product.regular_price)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(product.manage_stock)
        .bind(product.stock_status)
        .bind(product.thumbnail_id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self, meta), fields(id = %id, key = meta.key()))]
    async fn set_meta(&self, id: ProductId, meta: &ProductMeta) -> Result<(), RepositoryError> {
        let query = match meta {
            ProductMeta::RegularPrice(price) => sqlx::query(
                "UPDATE catalog.product SET regular_price = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(*price),
            ProductMeta::Price(price) => sqlx::query(
                "UPDATE catalog.product SET price = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(*price),
            ProductMeta::StockQuantity(quantity) => sqlx::query(
                "UPDATE catalog.product SET stock_quantity = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(*quantity),
            ProductMeta::StockStatus(status) => sqlx::query(
                "UPDATE catalog.product SET stock_status = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(*status),
            ProductMeta::Sku(sku) => sqlx::query(
                "UPDATE catalog.product SET sku = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(sku.clone()),
            ProductMeta::ManageStock(manage) => sqlx::query(
                "UPDATE catalog.product SET manage_stock = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(*manage),
        };

        let result = query
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id, url = %url))]
    async fn attach_image(&self, id: ProductId, url: &Url) -> Result<MediaId, RepositoryError> {
        let (content_type, bytes) = self.download_image(url).await?;

        let mut tx = self.pool.begin().await?;

        let media_id = sqlx::query_scalar::<_, MediaId>(
            r"
            INSERT INTO catalog.media (source_url, content_type, bytes, product_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(url.as_str())
        .bind(&content_type)
        .bind(&bytes)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE catalog.product SET thumbnail_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(media_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        tracing::debug!(media_id = %media_id, bytes = bytes.len(), "Image sideloaded");
        Ok(media_id)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, http::header, routing::get};
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    /// Store whose pool never connects; only the download path is exercised.
    fn offline_store() -> PgCatalogStore {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        PgCatalogStore::new(pool, reqwest::Client::new())
    }

    async fn image_server() -> Url {
        let oversized = usize::try_from(MAX_IMAGE_BYTES).unwrap() + 1;
        let app = Router::new()
            .route(
                "/small.png",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], vec![0_u8; 16]) }),
            )
            .route(
                "/huge.png",
                get(move || async move {
                    ([(header::CONTENT_TYPE, "image/png")], vec![0_u8; oversized])
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    #[tokio::test]
    async fn test_download_within_limit() {
        let base = image_server().await;
        let (content_type, bytes) = offline_store()
            .download_image(&base.join("small.png").unwrap())
            .await
            .unwrap();

        assert_eq!(content_type, "image/png");
        assert_eq!(bytes.len(), 16);
    }

    #[tokio::test]
    async fn test_oversized_image_is_rejected() {
        let base = image_server().await;
        let err = offline_store()
            .download_image(&base.join("huge.png").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Media(message) if message.contains("larger than")));
    }
}
