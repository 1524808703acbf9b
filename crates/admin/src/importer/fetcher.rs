//! Remote catalog client.
//!
//! Issues a single `GET` against the configured catalog endpoint and decodes
//! the `{ "products": [...] }` envelope. There is no pagination and no retry:
//! a transport failure or an unusable envelope ends the run before anything is
//! written.
//!
//! Individual entries that cannot be mapped do not fail the catalog. They are
//! yielded as [`CatalogEntry::Malformed`] and counted as skipped downstream.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use product_importer_core::{Price, RemoteProductId};

use super::markup::strip_markup;
use crate::config::CatalogConfig;

/// User agent sent with catalog and image requests.
pub const USER_AGENT: &str = concat!("product-importer/", env!("CARGO_PKG_VERSION"));

/// Errors that end an import run before reconciliation.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connection, TLS or non-2xx failure.
    #[error("failed to fetch products from catalog: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body is not JSON, or `products` is missing, not a list, or empty.
    #[error("catalog response is empty or malformed: {0}")]
    EmptyOrMalformed(String),
}

/// Reasons a single catalog entry cannot be mapped to a [`RemoteProduct`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry is not an object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("field '{0}' is negative")]
    Negative(&'static str),
    #[error("title is empty once markup is removed")]
    EmptyTitle,
}

/// A product as published by the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProduct {
    pub remote_id: RemoteProductId,
    /// Title with markup already removed.
    pub title: String,
    /// Description exactly as received.
    pub description: String,
    pub price: Price,
    pub stock_quantity: i32,
    pub thumbnail_url: Option<Url>,
}

/// An entry that could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
    /// Position in the `products` array.
    pub index: usize,
    /// Remote ID, if it could be read.
    pub remote_id: Option<RemoteProductId>,
    pub reason: EntryError,
}

/// One element of the decoded catalog, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    Product(RemoteProduct),
    Malformed(MalformedEntry),
}

impl From<RemoteProduct> for CatalogEntry {
    fn from(product: RemoteProduct) -> Self {
        Self::Product(product)
    }
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the remote catalog.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    url: Url,
}

impl CatalogClient {
    /// Create a client for the configured catalog endpoint.
    ///
    /// Uses the HTTP client's default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                url: config.url.clone(),
            }),
        })
    }

    /// The endpoint this client fetches from.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// The underlying HTTP client, shared with image downloads.
    #[must_use]
    pub fn http(&self) -> reqwest::Client {
        self.inner.client.clone()
    }

    /// Fetch and decode the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transport` on network failure or non-2xx status, and
    /// `FetchError::EmptyOrMalformed` if the body has no usable product list.
    #[instrument(skip(self), fields(url = %self.inner.url))]
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError> {
        let response = self
            .inner
            .client
            .get(self.inner.url.as_str())
            .send()
            .await?
            .error_for_status()?;

        let body = response.bytes().await?;
        let entries = decode_catalog(&body)?;

        tracing::info!(entries = entries.len(), "Fetched catalog");
        Ok(entries)
    }
}

// =============================================================================
// Decoding
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    products: Option<Value>,
}

/// Decode a catalog response body.
///
/// # Errors
///
/// Returns `FetchError::EmptyOrMalformed` if the body is not a JSON object, or
/// `products` is absent, not an array, or empty.
pub fn decode_catalog(body: &[u8]) -> Result<Vec<CatalogEntry>, FetchError> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| FetchError::EmptyOrMalformed(format!("invalid JSON: {e}")))?;

    let products = match envelope.products {
        None | Some(Value::Null) => {
            return Err(FetchError::EmptyOrMalformed(
                "missing 'products'".to_string(),
            ));
        }
        Some(Value::Array(products)) => products,
        Some(_) => {
            return Err(FetchError::EmptyOrMalformed(
                "'products' is not a list".to_string(),
            ));
        }
    };

    if products.is_empty() {
        return Err(FetchError::EmptyOrMalformed("no products".to_string()));
    }

    let entries = products
        .iter()
        .enumerate()
        .map(|(index, raw)| match map_entry(raw) {
            Ok(product) => CatalogEntry::Product(product),
            Err(reason) => {
                let remote_id = raw.get("id").and_then(read_id);
                tracing::warn!(index, remote_id = ?remote_id, %reason, "Malformed catalog entry");
                CatalogEntry::Malformed(MalformedEntry {
                    index,
                    remote_id,
                    reason,
                })
            }
        })
        .collect();

    Ok(entries)
}

fn read_id(value: &Value) -> Option<RemoteProductId> {
    value.as_i64().filter(|id| *id >= 0).map(RemoteProductId::new)
}

fn map_entry(raw: &Value) -> Result<RemoteProduct, EntryError> {
    let object = raw.as_object().ok_or(EntryError::NotAnObject)?;
    let field = |name: &'static str| {
        object
            .get(name)
            .filter(|value| !value.is_null())
            .ok_or(EntryError::MissingField(name))
    };

    let id = field("id")?.as_i64().ok_or_else(|| EntryError::InvalidField {
        field: "id",
        reason: "not an integer".to_string(),
    })?;
    if id < 0 {
        return Err(EntryError::Negative("id"));
    }

    let title = field("title")?
        .as_str()
        .ok_or_else(|| EntryError::InvalidField {
            field: "title",
            reason: "not a string".to_string(),
        })?;
    let title = strip_markup(title);
    if title.is_empty() {
        return Err(EntryError::EmptyTitle);
    }

    let description = object
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let price = read_price(field("price")?)?;
    let stock_quantity = read_stock(field("stock")?)?;
    let thumbnail_url = read_thumbnail(object.get("thumbnail"))?;

    Ok(RemoteProduct {
        remote_id: RemoteProductId::new(id),
        title,
        description,
        price,
        stock_quantity,
        thumbnail_url,
    })
}

fn read_price(value: &Value) -> Result<Price, EntryError> {
    let invalid = |reason: String| EntryError::InvalidField {
        field: "price",
        reason,
    };

    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return Err(invalid("not a number".to_string())),
    };

    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| invalid(e.to_string()))?;

    Price::new(amount).map_err(|_| EntryError::Negative("price"))
}

fn read_stock(value: &Value) -> Result<i32, EntryError> {
    let quantity = value.as_i64().ok_or_else(|| EntryError::InvalidField {
        field: "stock",
        reason: "not an integer".to_string(),
    })?;

    if quantity < 0 {
        return Err(EntryError::Negative("stock"));
    }

    i32::try_from(quantity).map_err(|e| EntryError::InvalidField {
        field: "stock",
        reason: e.to_string(),
    })
}

fn read_thumbnail(value: Option<&Value>) -> Result<Option<Url>, EntryError> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => return Ok(None),
        Some(Value::String(raw)) => raw.trim(),
        Some(_) => {
            return Err(EntryError::InvalidField {
                field: "thumbnail",
                reason: "not a string".to_string(),
            });
        }
    };

    let url = Url::parse(raw).map_err(|e| EntryError::InvalidField {
        field: "thumbnail",
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(EntryError::InvalidField {
            field: "thumbnail",
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(Some(url))
}
