//! Core types for the product importer.
//!
//! This module provides type-safe wrappers for common catalog concepts.

pub mod id;
pub mod price;
pub mod sku;
pub mod status;

pub use id::*;
pub use price::{Price, PriceError};
pub use sku::{IMPORTED_SKU_PREFIX, Sku, SkuError};
pub use status::*;
