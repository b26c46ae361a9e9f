//! Shared state handed to every request handler

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use crate::application::bulk_import::BulkImporter;
use crate::application::catalog::CatalogService;
use crate::infrastructure::analytics_repository::AnalyticsRepository;
use crate::infrastructure::config::ServerConfig;
use crate::infrastructure::image_proxy::ImageProxy;
use crate::infrastructure::marketplace::StorePageFetcher;
use crate::infrastructure::product_repository::ProductRepository;
use crate::infrastructure::scraper::MetadataScraper;

/// Services and configuration shared by the router; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub products: ProductRepository,
    pub analytics: AnalyticsRepository,
    pub catalog: CatalogService,
    pub scraper: MetadataScraper,
    pub image_proxy: ImageProxy,
    pub importer: BulkImporter,
}

impl AppState {
    /// Wire repositories and HTTP clients over an already migrated pool
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Result<Self> {
        let products = ProductRepository::new(pool.clone());
        let analytics = AnalyticsRepository::new(pool);

        let scraper = MetadataScraper::new(&config.scraper).context("building product page client")?;
        let image_proxy = ImageProxy::new(&config.scraper).context("building image proxy client")?;
        let fetcher = StorePageFetcher::new(&config.scraper).context("building store page client")?;

        std::fs::create_dir_all(&config.uploads_dir)
            .with_context(|| format!("creating uploads directory {}", config.uploads_dir.display()))?;

        if config.admin_password.is_empty() {
            info!("🔓 No admin password set, admin pages are open");
        }

        Ok(Self {
            catalog: CatalogService::new(products.clone(), analytics.clone()),
            importer: BulkImporter::new(products.clone(), fetcher),
            config: Arc::new(config),
            products,
            analytics,
            scraper,
            image_proxy,
        })
    }
}
