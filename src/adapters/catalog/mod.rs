//! Catalog adapters.

mod static_catalog;

pub use static_catalog::StaticCatalog;
