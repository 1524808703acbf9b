//! Integration tests for the `PostgreSQL` catalog store.
//!
//! These tests require:
//! - A running `PostgreSQL` database
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) pointing at it
//!
//! Migrations are applied by the tests. Run with:
//! `cargo test -p product-importer-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use secrecy::SecretString;
use serde_json::json;
use sqlx::PgPool;

use product_importer_admin::db::{self, PgCatalogStore, RepositoryError};
use product_importer_admin::importer::{CatalogStore, FailureKind, Reconciler, run_import};
use product_importer_admin::models::{NewProduct, ProductMeta};
use product_importer_core::{ProductKind, ProductStatus, Sku, StockStatus};
use product_importer_integration_tests::FakeCatalog;

async fn pool() -> PgPool {
    let url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("ADMIN_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../admin/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Remote IDs and titles that will not collide with earlier runs.
fn unique_id() -> i64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_nanos();
    i64::try_from(nanos % 1_000_000_000_000).expect("fits in i64")
}

fn new_product(title: &str, status: ProductStatus) -> NewProduct {
    NewProduct {
        title: title.to_string(),
        description: String::new(),
        status,
        kind: ProductKind::Simple,
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_import_creates_then_merges() {
    let id = unique_id();
    let title = format!("Widget {id}");
    let catalog = FakeCatalog::json(&json!({
        "products": [{
            "id": id,
            "title": &title,
            "description": "<p>d</p>",
            "price": 10.00,
            "stock": 5,
            "thumbnail": null
        }]
    }))
    .await;
    let client = catalog.client();
    let store = PgCatalogStore::new(pool().await, client.http());

    let first = run_import(&client, &store).await.unwrap();
    assert_eq!(first.created, 1);

    let sku = Sku::parse(&format!("dummy-{id}")).unwrap();
    let product_id = store.find_by_sku(&sku).await.unwrap().expect("created");
    let product = store.load(product_id).await.unwrap();
    assert_eq!(product.title, title);
    assert_eq!(product.description, "<p>d</p>");
    assert_eq!(product.status, ProductStatus::Published);
    assert_eq!(product.price.unwrap().to_string(), "$10.00");
    assert_eq!(product.stock_quantity, Some(5));
    assert_eq!(product.stock_status, Some(StockStatus::InStock));
    assert!(product.manage_stock);

    let second = run_import(&client, &store).await.unwrap();
    assert_eq!((second.created, second.updated), (0, 1));

    let product = store.load(product_id).await.unwrap();
    assert_eq!(product.price.unwrap().to_string(), "$20.00");
    assert_eq!(product.regular_price.unwrap().to_string(), "$20.00");
    assert_eq!(product.stock_quantity, Some(10));
    assert_eq!(product.stock_status, Some(StockStatus::InStock));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_title_lookup_only_sees_published() {
    let store = PgCatalogStore::new(pool().await, reqwest::Client::new());
    let title = format!("Lookup {}", unique_id());

    let draft = store
        .create(&new_product(&title, ProductStatus::Draft))
        .await
        .unwrap();
    assert_eq!(store.find_by_title(&title).await.unwrap(), None);

    let first = store
        .create(&new_product(&title, ProductStatus::Published))
        .await
        .unwrap();
    let second = store
        .create(&new_product(&title, ProductStatus::Published))
        .await
        .unwrap();

    assert_ne!(draft, first);
    assert!(first < second);
    assert_eq!(store.find_by_title(&title).await.unwrap(), Some(first));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_sku_conflict_and_trash() {
    let store = PgCatalogStore::new(pool().await, reqwest::Client::new());
    let sku = Sku::parse(&format!("dummy-{}", unique_id())).unwrap();

    let a = store
        .create(&new_product("A", ProductStatus::Published))
        .await
        .unwrap();
    let b = store
        .create(&new_product("B", ProductStatus::Published))
        .await
        .unwrap();

    store.set_meta(a, &ProductMeta::Sku(sku.clone())).await.unwrap();
    let err = store
        .set_meta(b, &ProductMeta::Sku(sku.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let mut trashed = store.load(a).await.unwrap();
    trashed.status = ProductStatus::Trash;
    store.save(&trashed).await.unwrap();

    assert_eq!(store.find_by_sku(&sku).await.unwrap(), None);
    store.set_meta(b, &ProductMeta::Sku(sku.clone())).await.unwrap();
    assert_eq!(store.find_by_sku(&sku).await.unwrap(), Some(b));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_image_attach() {
    let catalog = FakeCatalog::json(&json!({ "products": [] })).await;
    let store = PgCatalogStore::new(pool().await, catalog.client().http());

    let id = store
        .create(&new_product("Pictured", ProductStatus::Published))
        .await
        .unwrap();

    let media = store
        .attach_image(id, &catalog.url("/images/ok.png"))
        .await
        .unwrap();
    assert_eq!(store.load(id).await.unwrap().thumbnail_id, Some(media));

    let err = store
        .attach_image(id, &catalog.url("/images/not-an-image.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Media(_)));

    let err = store
        .attach_image(id, &catalog.url("/images/missing.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Media(_)));

    // failed attaches leave the earlier thumbnail in place
    assert_eq!(store.load(id).await.unwrap().thumbnail_id, Some(media));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_image_failure_is_counted_not_fatal() {
    let id = unique_id();
    let catalog_body = |thumbnail: &str| {
        json!({
            "products": [{ "id": id, "title": format!("Img {id}"), "price": 1, "stock": 1, "thumbnail": thumbnail }]
        })
    };
    let image_host = FakeCatalog::json(&json!({ "products": [] })).await;
    let missing = image_host.url("/images/missing.png");
    let catalog = FakeCatalog::json(&catalog_body(missing.as_str())).await;
    let client = catalog.client();
    let store = PgCatalogStore::new(pool().await, client.http());

    let entries = client.fetch_catalog().await.unwrap();
    let summary = Reconciler::new(&store).reconcile(entries).await;

    assert_eq!((summary.created, summary.image_failures), (1, 1));
    assert_eq!(summary.failures[0].kind, FailureKind::Image);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_prices_are_stored_exactly() {
    let id = unique_id();
    let catalog = FakeCatalog::json(&json!({
        "products": [{ "id": id, "title": format!("Precise {id}"), "price": "19.99999", "stock": 1 }]
    }))
    .await;
    let client = catalog.client();
    let store = PgCatalogStore::new(pool().await, client.http());

    run_import(&client, &store).await.unwrap();
    run_import(&client, &store).await.unwrap();

    let sku = Sku::parse(&format!("dummy-{id}")).unwrap();
    let product_id = store.find_by_sku(&sku).await.unwrap().expect("created");
    let product = store.load(product_id).await.unwrap();
    assert_eq!(product.price.unwrap().amount().to_string(), "39.99998");
    assert_eq!(product.regular_price.unwrap().amount().to_string(), "39.99998");
}
