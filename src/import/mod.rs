// # Import Module
//
// Turns Discogs releases into store products:
//
// - **Mapper**: Pure release → `ProductDraft` conversion (text, status, taxonomy, meta)
// - **Hooks**: Ordered extension points around search and product creation
// - **ImportService**: Duplicate guard, persistence, categories, image sideload
//
// Public API:
// - `ImportService`: Search the catalog and import a release
// - `ImportHook` / `Hooks`: Observe or alter the import
// - `ProductDraft`: What the store receives

pub mod hooks;
pub mod mapper;
mod service;
mod types;

pub use hooks::{Hooks, ImportHook};
pub use mapper::MapperOptions;
pub use service::{ImportError, ImportService, PRODUCT_EXISTS_MESSAGE};
pub use types::{meta_keys, CategoryBranch, ImportedProduct, ProductDraft};
