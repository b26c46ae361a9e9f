//! Domain module - catalog records and business rules
//!
//! Each module is its own file in the domain/ directory;
//! commonly used items are re-exported here.

pub mod analytics;
pub mod catalog;
pub mod product;

pub use analytics::{AnalyticsSummary, ClickEvent, PageView, SiteStats};
pub use catalog::{Platform, SortOrder, auto_category, detect_platform, map_marketplace_category};
pub use product::{NewProduct, Product, ProductPatch};
