//! Admin router driven in-process with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;
use tower::ServiceExt;

use product_importer_admin::importer::{CatalogClient, MemoryCatalogStore};
use product_importer_admin::state::AppState;
use product_importer_integration_tests::{FakeCatalog, unreachable_client, widget_catalog};

fn app(client: CatalogClient, store: Arc<MemoryCatalogStore>) -> Router {
    product_importer_admin::app(AppState::new(client, store))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/import")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let store = Arc::new(MemoryCatalogStore::new());
    let app = app(unreachable_client().await, store);

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_root_redirects_to_import() {
    let app = app(unreachable_client().await, Arc::new(MemoryCatalogStore::new()));

    let response = app.oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/import");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = app(unreachable_client().await, Arc::new(MemoryCatalogStore::new()));

    let response = app.oneshot(get("/wp-admin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_import_page_shows_form_only() {
    let catalog = FakeCatalog::json(&widget_catalog()).await;
    let app = app(catalog.client(), Arc::new(MemoryCatalogStore::new()));

    let response = app.oneshot(get("/import")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<form method=\"post\""));
    assert!(html.contains("name=\"import_products\""));
    assert!(!html.contains("sweetalert2"));
    assert_eq!(catalog.hits(), 0);
}

#[tokio::test]
async fn test_submit_runs_import() {
    let catalog = FakeCatalog::json(&widget_catalog()).await;
    let store = Arc::new(MemoryCatalogStore::new());
    let app = app(catalog.client(), Arc::clone(&store));

    let response = app
        .oneshot(post_form("import_products=Import+Products"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Products imported successfully."));
    assert!(html.contains("Created: 1"));
    assert!(html.contains("https://cdn.jsdelivr.net/npm/sweetalert2@11"));

    let products = store.products().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].sku.as_ref().unwrap().as_str(), "dummy-1");
}

#[tokio::test]
async fn test_submit_without_import_control_does_nothing() {
    let catalog = FakeCatalog::json(&widget_catalog()).await;
    let store = Arc::new(MemoryCatalogStore::new());
    let app = app(catalog.client(), Arc::clone(&store));

    let response = app.oneshot(post_form("other=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(!html.contains("sweetalert2"));
    assert_eq!(catalog.hits(), 0);
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn test_fetch_failure_banner() {
    let store = Arc::new(MemoryCatalogStore::new());
    let app = app(unreachable_client().await, Arc::clone(&store));

    let response = app
        .oneshot(post_form("import_products=Import+Products"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Failed to fetch products from API."));
    assert!(!html.contains("sweetalert2"));
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn test_empty_catalog_banner() {
    let catalog = FakeCatalog::json(&json!({ "products": [] })).await;
    let store = Arc::new(MemoryCatalogStore::new());
    let app = app(catalog.client(), Arc::clone(&store));

    let response = app
        .oneshot(post_form("import_products=Import+Products"))
        .await
        .unwrap();

    let html = body_text(response).await;
    assert!(html.contains("No products found."));
    assert_eq!(store.write_count().await, 0);
}

#[tokio::test]
async fn test_item_failures_are_listed() {
    let catalog = FakeCatalog::json(&json!({
        "products": [
            { "id": 1, "title": "Widget", "price": 10, "stock": 5 },
            { "id": 2, "title": "No stock field", "price": 10 }
        ]
    }))
    .await;
    let app = app(catalog.client(), Arc::new(MemoryCatalogStore::new()));

    let html = body_text(
        app.oneshot(post_form("import_products=Import+Products"))
            .await
            .unwrap(),
    )
    .await;

    assert!(html.contains("Created: 1"));
    assert!(html.contains("Skipped: 1"));
    assert!(html.contains("malformed entry"));
}
