//! Infrastructure layer: configuration, logging, persistence and outbound HTTP
//!
//! Database access, the product page scraper, the marketplace store parser,
//! the image proxy and the small encoders (QR, sitemap) used by the web layer.

pub mod analytics_repository;
pub mod config;
pub mod database_connection;
pub mod image_proxy;
pub mod logging;
pub mod marketplace;
pub mod product_repository;
pub mod qr;
pub mod scrape_error;
pub mod scraper;
pub mod simple_http_client;
pub mod sitemap;

// Re-export commonly used items
pub use analytics_repository::AnalyticsRepository;
pub use self::config::{ConfigError, LoggingConfig, ScraperConfig, ServerConfig};
pub use database_connection::DatabaseConnection;
pub use image_proxy::{ImageProxy, ProxyRejection, allowed_image_url};
pub use logging::init_logging;
pub use marketplace::{MarketplaceProduct, StorePage, StorePageFetcher, normalize_store_url, parse_store_page};
pub use product_repository::ProductRepository;
pub use scrape_error::{JsonPathError, ScrapeError, ScrapeResult};
pub use self::scraper::{MetadataScraper, ScrapedProduct, extract_product_info};
pub use simple_http_client::{FetchedResponse, HttpClient, HttpClientConfig};
