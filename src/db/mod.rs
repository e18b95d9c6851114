mod client;
mod models;
mod store;

pub use client::Database;
pub use models::{DbCategory, DbProduct, DbProductMeta, ProductStatus};
pub use store::{ProductStore, StoreError};
