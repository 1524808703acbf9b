//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! # Import
//! GET  /                       - Redirect to /import
//! GET  /import                 - Import page with the import form
//! POST /import                 - Run an import and render the result
//! ```

pub mod health;
pub mod import;

use axum::{Router, http::Uri, response::Redirect, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/", get(|| async { Redirect::to("/import") }))
        .merge(import::router())
        .fallback(not_found)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{CatalogConfig, DEFAULT_CATALOG_URL, parse_catalog_url};
    use crate::importer::{CatalogClient, MemoryCatalogStore};

    fn state() -> AppState {
        let config = CatalogConfig::new(parse_catalog_url(DEFAULT_CATALOG_URL).unwrap());
        AppState::new(
            CatalogClient::new(&config).unwrap(),
            Arc::new(MemoryCatalogStore::new()),
        )
    }

    async fn status_of(uri: &str) -> StatusCode {
        routes()
            .with_state(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_routes() {
        assert_eq!(status_of("/health").await, StatusCode::OK);
        assert_eq!(status_of("/health/ready").await, StatusCode::OK);
        assert_eq!(status_of("/import").await, StatusCode::OK);
        assert_eq!(status_of("/").await, StatusCode::SEE_OTHER);
        assert_eq!(status_of("/products").await, StatusCode::NOT_FOUND);
    }
}
