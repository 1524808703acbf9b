//! Catalog import page.
//!
//! A single form posts back to `/import`; the import runs synchronously inside
//! the request and the result is rendered on the same page. The success
//! notification script is only included after a completed import.

use askama::Template;
use axum::{Form, Router, extract::State, response::Html, routing::get};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::importer::{FetchError, ImportSummary, ItemFailure, run_import};
use crate::state::AppState;

/// Name of the submit control that triggers an import.
pub const IMPORT_FIELD: &str = "import_products";

// =============================================================================
// Templates
// =============================================================================

/// Per-item failure row.
#[derive(Debug, Clone)]
pub struct FailureView {
    pub remote_id: String,
    pub kind: String,
    pub message: String,
}

impl From<&ItemFailure> for FailureView {
    fn from(failure: &ItemFailure) -> Self {
        Self {
            remote_id: failure
                .remote_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
            kind: failure.kind.to_string(),
            message: failure.message.clone(),
        }
    }
}

/// Import result for template rendering.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub image_failures: usize,
    pub failures: Vec<FailureView>,
}

impl From<&ImportSummary> for SummaryView {
    fn from(summary: &ImportSummary) -> Self {
        Self {
            created: summary.created,
            updated: summary.updated,
            skipped: summary.skipped,
            image_failures: summary.image_failures,
            failures: summary.failures.iter().map(FailureView::from).collect(),
        }
    }
}

/// Import page template.
#[derive(Template)]
#[template(path = "import/index.html")]
pub struct ImportPageTemplate {
    pub catalog_url: String,
    pub field_name: &'static str,
    pub error_message: Option<String>,
    pub summary: Option<SummaryView>,
}

impl ImportPageTemplate {
    fn new(state: &AppState) -> Self {
        Self {
            catalog_url: state.catalog().url().to_string(),
            field_name: IMPORT_FIELD,
            error_message: None,
            summary: None,
        }
    }
}

/// Banner text for a run that ended before reconciliation.
#[must_use]
pub fn fetch_error_message(error: &FetchError) -> &'static str {
    match error {
        FetchError::Transport(_) => "Failed to fetch products from API.",
        FetchError::EmptyOrMalformed(_) => "No products found.",
    }
}

/// Build the import router.
pub fn router() -> Router<AppState> {
    Router::new().route("/import", get(import_page).post(submit_import))
}

#[derive(Debug, Deserialize)]
pub struct ImportForm {
    pub import_products: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the import form.
///
/// GET /import
async fn import_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    Ok(Html(ImportPageTemplate::new(&state).render()?))
}

/// Run an import if the form was submitted with the import control.
///
/// POST /import
#[instrument(skip_all)]
async fn submit_import(
    State(state): State<AppState>,
    Form(form): Form<ImportForm>,
) -> Result<Html<String>, AppError> {
    let mut page = ImportPageTemplate::new(&state);

    if form.import_products.is_some() {
        match run_import(state.catalog(), state.store()).await {
            Ok(summary) => page.summary = Some(SummaryView::from(&summary)),
            Err(e) => page.error_message = Some(fetch_error_message(&e).to_string()),
        }
    } else {
        tracing::debug!("Import form posted without the import control");
    }

    Ok(Html(page.render()?))
}

#[cfg(test)]
mod tests {
    use product_importer_core::RemoteProductId;

    use super::*;
    use crate::importer::FailureKind;

    #[test]
    fn test_fetch_error_messages() {
        let err = FetchError::EmptyOrMalformed("missing 'products'".to_string());
        assert_eq!(fetch_error_message(&err), "No products found.");
    }

    #[test]
    fn test_summary_view() {
        let summary = ImportSummary {
            created: 2,
            updated: 1,
            skipped: 1,
            image_failures: 0,
            failures: vec![ItemFailure {
                remote_id: None,
                kind: FailureKind::Malformed,
                message: "entry 3: missing field 'id'".to_string(),
            }],
        };

        let view = SummaryView::from(&summary);
        assert_eq!(view.created, 2);
        assert_eq!(view.failures[0].remote_id, "-");
        assert_eq!(view.failures[0].kind, "malformed entry");

        let failure = ItemFailure {
            remote_id: Some(RemoteProductId::new(7)),
            kind: FailureKind::Image,
            message: "media error".to_string(),
        };
        assert_eq!(FailureView::from(&failure).remote_id, "7");
    }

    #[test]
    fn test_template_renders_summary_and_script() {
        let page = ImportPageTemplate {
            catalog_url: "https://dummyjson.com/products".to_string(),
            field_name: IMPORT_FIELD,
            error_message: None,
            summary: Some(SummaryView {
                created: 3,
                updated: 0,
                skipped: 0,
                image_failures: 0,
                failures: Vec::new(),
            }),
        };

        let html = page.render().expect("render");
        assert!(html.contains("name=\"import_products\""));
        assert!(html.contains("Created: 3"));
        assert!(html.contains("sweetalert2"));
    }

    #[test]
    fn test_template_without_import_has_no_script() {
        let page = ImportPageTemplate {
            catalog_url: "https://dummyjson.com/products".to_string(),
            field_name: IMPORT_FIELD,
            error_message: Some("No products found.".to_string()),
            summary: None,
        };

        let html = page.render().expect("render");
        assert!(html.contains("No products found."));
        assert!(!html.contains("sweetalert2"));
    }
}
