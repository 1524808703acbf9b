//! Integration tests for the product importer.
//!
//! # Running Tests
//!
//! ```bash
//! # Fake catalog server + in-memory store (no external services)
//! cargo test -p product-importer-integration-tests
//!
//! # Include the PostgreSQL store tests
//! ADMIN_DATABASE_URL=postgres://... cargo test -p product-importer-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `import_pipeline` - Fetcher and reconciler against a fake catalog server
//! - `admin_import_page` - Admin router driven in-process
//! - `postgres_store` - `PostgreSQL` store (ignored by default)

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use product_importer_admin::config::CatalogConfig;
use product_importer_admin::importer::CatalogClient;

/// Smallest valid PNG (1x1 transparent pixel).
pub const PNG_PIXEL: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Clone)]
struct CatalogResponse {
    status: StatusCode,
    content_type: &'static str,
    body: String,
    hits: Arc<AtomicUsize>,
}

/// A local HTTP server standing in for the remote catalog.
///
/// - `GET /products` returns the configured response
/// - `GET /images/ok.png` returns a PNG
/// - `GET /images/not-an-image.png` returns `text/plain`
/// - anything else is a 404
pub struct FakeCatalog {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl FakeCatalog {
    /// Serve `body` as JSON with status 200.
    pub async fn json(body: &serde_json::Value) -> Self {
        Self::serve(StatusCode::OK, "application/json", body.to_string()).await
    }

    /// Serve an arbitrary response from `/products`.
    pub async fn serve(status: StatusCode, content_type: &'static str, body: String) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = CatalogResponse {
            status,
            content_type,
            body,
            hits: Arc::clone(&hits),
        };

        let app = Router::new()
            .route("/products", get(products))
            .route(
                "/images/ok.png",
                get(|| async { ([(header::CONTENT_TYPE, "image/png")], PNG_PIXEL) }),
            )
            .route(
                "/images/not-an-image.png",
                get(|| async { ([(header::CONTENT_TYPE, "text/plain")], "nope") }),
            )
            .with_state(response);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake catalog");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake catalog crashed");
        });

        Self { addr, hits, handle }
    }

    /// URL of a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).expect("Invalid fake catalog URL")
    }

    /// Catalog endpoint (`/products`).
    #[must_use]
    pub fn catalog_url(&self) -> Url {
        self.url("/products")
    }

    /// Client pointed at this server's catalog endpoint.
    #[must_use]
    pub fn client(&self) -> CatalogClient {
        CatalogClient::new(&CatalogConfig::new(self.catalog_url()))
            .expect("Failed to build catalog client")
    }

    /// Number of catalog requests served so far.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn products(State(response): State<CatalogResponse>) -> impl IntoResponse {
    response.hits.fetch_add(1, Ordering::SeqCst);
    (
        response.status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
}

/// A client for an endpoint where nothing is listening.
pub async fn unreachable_client() -> CatalogClient {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);

    let url = Url::parse(&format!("http://{addr}/products")).expect("Invalid URL");
    CatalogClient::new(&CatalogConfig::new(url)).expect("Failed to build catalog client")
}

/// The single-product catalog used throughout the tests.
#[must_use]
pub fn widget_catalog() -> serde_json::Value {
    serde_json::json!({
        "products": [
            { "id": 1, "title": "Widget", "price": 10.00, "stock": 5, "description": "d" }
        ],
        "total": 1,
        "skip": 0,
        "limit": 30
    })
}
