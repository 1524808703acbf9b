//! Domain models for admin.

pub mod product;

pub use product::{LocalProduct, NewProduct, ProductMeta};
