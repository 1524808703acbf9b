//! Product Importer Core - Shared catalog types.
//!
//! This crate provides the types shared by the importer components:
//! - `admin` - Import page, catalog fetcher, reconciler and `PostgreSQL` store
//! - `cli` - Command-line tools for migrations and terminal-driven imports
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, SKUs, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
