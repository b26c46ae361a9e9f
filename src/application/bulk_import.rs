//! Background import of a marketplace store
//!
//! Only one import runs at a time. Progress lives in a shared [`ImportStatus`]
//! that the status endpoint snapshots while the job updates it. Products whose
//! title already exists in the catalog are skipped; failed inserts are counted
//! and the job moves on.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::domain::product::title_key;
use crate::infrastructure::marketplace::{MarketplaceProduct, StorePage, StorePageFetcher};
use crate::infrastructure::product_repository::ProductRepository;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Import already running")]
    AlreadyRunning,
}

/// Progress of the current (or last) store import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStatus {
    pub running: bool,
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<MarketplaceProduct>,
    pub message: String,
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Result of a synchronous JSON import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub total: usize,
}

#[derive(Clone)]
pub struct BulkImporter {
    products: ProductRepository,
    fetcher: StorePageFetcher,
    status: Arc<Mutex<ImportStatus>>,
}

impl BulkImporter {
    pub fn new(products: ProductRepository, fetcher: StorePageFetcher) -> Self {
        Self {
            products,
            fetcher,
            status: Arc::new(Mutex::new(ImportStatus::default())),
        }
    }

    /// Reset the status and run the import in the background
    pub async fn start(&self, store_url: String) -> Result<(), ImportError> {
        {
            let mut status = self.status.lock().await;
            if status.running {
                return Err(ImportError::AlreadyRunning);
            }
            *status = ImportStatus {
                running: true,
                message: "Starting import...".to_string(),
                started_at: Some(Utc::now()),
                ..ImportStatus::default()
            };
        }

        info!("📦 Bulk import started: {}", store_url);
        let importer = self.clone();
        tokio::spawn(async move {
            let job = tokio::spawn(importer.clone().run(store_url));
            if let Err(e) = job.await {
                error!("Bulk import task aborted: {}", e);
            }
            importer.finish().await;
        });
        Ok(())
    }

    pub async fn status(&self) -> ImportStatus {
        self.status.lock().await.clone()
    }

    async fn set_message(&self, message: String) {
        self.status.lock().await.message = message;
    }

    async fn run(self, store_url: String) {
        self.set_message("Fetching store page...".to_string()).await;

        let page = match self.fetcher.fetch_store_page(&store_url).await {
            Ok(page) => page,
            Err(e) => {
                if e.is_blocked() {
                    warn!("🚫 Marketplace refused the store page request: {}", store_url);
                } else {
                    warn!("Store import failed: {}", e);
                }
                let mut status = self.status.lock().await;
                status.message = format!("Error: {e}");
                status.errors.push(e.to_string());
                return;
            }
        };

        self.import_listing(page).await;
    }

    /// Import every product of a parsed store page, updating the status as it goes
    pub async fn import_listing(&self, page: StorePage) {
        let total = page.products.len();
        {
            let mut status = self.status.lock().await;
            status.total = total;
            status.message = format!(
                "Found {} products (of {} total in store). Importing...",
                total, page.total_count
            );
        }

        let mut seen = self.existing_titles().await;

        for (index, product) in page.products.into_iter().enumerate() {
            self.set_message(format!("Processing {}/{}: {}", index + 1, total, product.name))
                .await;

            let key = title_key(&product.name);
            if seen.contains(&key) {
                self.status.lock().await.skipped += 1;
                continue;
            }

            match self.products.insert(&product.clone().into_new_product()).await {
                Ok(_) => {
                    let mut status = self.status.lock().await;
                    status.imported += 1;
                    status.products.push(product);
                    seen.insert(key);
                }
                Err(e) => {
                    warn!("Failed to import {}: {:#}", product.name, e);
                    let mut status = self.status.lock().await;
                    status.failed += 1;
                    status.errors.push(format!("{}: {:#}", product.name, e));
                }
            }
        }

        let mut status = self.status.lock().await;
        status.message = format!(
            "Done! Imported {}, skipped {} (already exist), failed {}",
            status.imported, status.skipped, status.failed
        );
        info!("✅ {}", status.message);
    }

    async fn finish(&self) {
        let mut status = self.status.lock().await;
        status.running = false;
        status.finished_at = Some(Utc::now());
    }

    /// Synchronous import of already scraped products; insert failures are skipped
    pub async fn import_payload(&self, products: Vec<MarketplaceProduct>) -> Result<ImportSummary> {
        let mut seen = self.products.title_keys().await?;
        let mut summary = ImportSummary {
            total: products.len(),
            ..ImportSummary::default()
        };

        for product in products {
            let key = title_key(&product.name);
            if seen.contains(&key) {
                summary.skipped += 1;
                continue;
            }
            match self.products.insert(&product.into_new_product()).await {
                Ok(_) => {
                    summary.imported += 1;
                    seen.insert(key);
                }
                Err(e) => warn!("Skipping product that failed to save: {:#}", e),
            }
        }

        info!(
            "📥 JSON import: {} imported, {} skipped of {}",
            summary.imported, summary.skipped, summary.total
        );
        Ok(summary)
    }

    /// Titles already in the catalog; a failed lookup imports without deduplication
    async fn existing_titles(&self) -> HashSet<String> {
        match self.products.title_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Could not load existing titles: {:#}", e);
                HashSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ScraperConfig;
    use crate::infrastructure::database_connection::DatabaseConnection;
    use crate::domain::product::NewProduct;
    use tempfile::TempDir;

    async fn setup() -> Result<(TempDir, BulkImporter, ProductRepository)> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite:{}", dir.path().join("import.db").to_string_lossy());
        let db = DatabaseConnection::new(&url).await?;
        db.migrate().await?;
        let products = ProductRepository::new(db.pool().clone());
        let fetcher = StorePageFetcher::new(&ScraperConfig::default())?;
        Ok((dir, BulkImporter::new(products.clone(), fetcher), products))
    }

    fn listed(name: &str, price: i64) -> MarketplaceProduct {
        MarketplaceProduct {
            name: name.into(),
            price,
            slug: name.to_lowercase().replace(' ', "-"),
            ..MarketplaceProduct::default()
        }
    }

    #[tokio::test]
    async fn payload_import_skips_existing_and_repeated_titles() -> Result<()> {
        let (_dir, importer, products) = setup().await?;
        products
            .insert(&NewProduct {
                title: "Denim Cap".into(),
                ..NewProduct::default()
            })
            .await?;

        let summary = importer
            .import_payload(vec![
                listed(" denim cap ", 199),
                listed("Night Lamp", 350),
                listed("NIGHT LAMP", 360),
            ])
            .await?;

        assert_eq!(summary, ImportSummary { imported: 1, skipped: 2, total: 3 });
        let lamp = products.search("Night Lamp").await?;
        assert_eq!(lamp.len(), 1);
        assert_eq!(lamp[0].price, "₹350");
        assert_eq!(lamp[0].platform, "Meesho");
        assert_eq!(lamp[0].category, "Other");
        Ok(())
    }

    #[tokio::test]
    async fn listing_import_reports_progress() -> Result<()> {
        let (_dir, importer, products) = setup().await?;
        products
            .insert(&NewProduct {
                title: "Mug".into(),
                ..NewProduct::default()
            })
            .await?;

        let page = StorePage {
            products: vec![listed("Mug", 150), listed("Hoodie", 499), listed("Beanie", 199)],
            total_count: 40,
        };
        importer.import_listing(page).await;

        let status = importer.status().await;
        assert_eq!(status.total, 3);
        assert_eq!(status.imported, 2);
        assert_eq!(status.skipped, 1);
        assert_eq!(status.failed, 0);
        assert_eq!(status.products.len(), 2);
        assert_eq!(status.message, "Done! Imported 2, skipped 1 (already exist), failed 0");
        assert_eq!(products.count().await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_running() -> Result<()> {
        let (_dir, importer, _) = setup().await?;
        importer.status.lock().await.running = true;

        assert_eq!(
            importer.start("https://www.meesho.com/Shop".into()).await,
            Err(ImportError::AlreadyRunning)
        );
        Ok(())
    }

    async fn wait_until_finished(importer: &BulkImporter) -> ImportStatus {
        for _ in 0..200 {
            let status = importer.status().await;
            if !status.running {
                return status;
            }
            tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        }
        panic!("import did not finish");
    }

    #[tokio::test]
    async fn failed_fetch_finishes_the_job_and_allows_a_new_start() -> Result<()> {
        let (_dir, importer, _) = setup().await?;

        importer.start("http://127.0.0.1:1/store".into()).await?;
        let status = wait_until_finished(&importer).await;

        assert!(status.message.starts_with("Error: HTTP request failed"), "{}", status.message);
        assert_eq!(status.errors.len(), 1);
        assert!(status.started_at.is_some());
        assert!(status.finished_at.is_some());
        assert_eq!(status.imported, 0);

        importer.start("http://127.0.0.1:1/store".into()).await?;
        let status = wait_until_finished(&importer).await;
        assert_eq!(status.errors.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn insert_failures_are_counted_and_reported() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite:{}", dir.path().join("closed.db").to_string_lossy());
        let db = DatabaseConnection::new(&url).await?;
        db.migrate().await?;
        let products = ProductRepository::new(db.pool().clone());
        let importer = BulkImporter::new(products, StorePageFetcher::new(&ScraperConfig::default())?);
        db.pool().close().await;

        importer
            .import_listing(StorePage {
                products: vec![listed("Hoodie", 499), listed("Beanie", 199)],
                total_count: 2,
            })
            .await;

        let status = importer.status().await;
        assert_eq!(status.failed, 2);
        assert_eq!(status.imported, 0);
        assert_eq!(status.errors.len(), 2);
        assert!(status.errors[0].starts_with("Hoodie: "));
        assert_eq!(status.message, "Done! Imported 0, skipped 0 (already exist), failed 2");
        Ok(())
    }

    #[test]
    fn status_json_omits_empty_products_and_unfinished_time() -> Result<()> {
        let status = ImportStatus {
            running: true,
            message: "Starting import...".into(),
            ..ImportStatus::default()
        };
        let json = serde_json::to_value(&status)?;
        assert_eq!(json["running"], true);
        assert_eq!(json["message"], "Starting import...");
        assert!(json.get("products").is_none());
        assert!(json.get("finished_at").is_none());
        assert_eq!(json["errors"], serde_json::json!([]));
        Ok(())
    }
}
