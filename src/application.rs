//! Application layer
//!
//! Use cases that combine the repositories and HTTP clients: page assembly
//! for the storefront, the bulk import job, and the shared request state.

pub mod bulk_import;
pub mod catalog;
pub mod state;

pub use bulk_import::{BulkImporter, ImportError, ImportStatus, ImportSummary};
pub use catalog::{CatalogService, CategoryGroup, CategoryPage, HomePage, ProductPage};
pub use state::AppState;
