// Database connection and pool management
// SQLite via sqlx; the schema is bootstrapped at startup

use anyhow::{Context, Result};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use tracing::info;

pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    pub async fn new(database_url: &str) -> Result<Self> {
        let db_path = database_url
            .strip_prefix("sqlite://")
            .or_else(|| database_url.strip_prefix("sqlite:"))
            .unwrap_or(database_url);

        if db_path != ":memory:" {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .with_context(|| format!("creating database directory {}", parent.display()))?;
                }
            }

            // sqlx does not create missing SQLite files from a plain URL
            if !Path::new(db_path).exists() {
                std::fs::File::create(db_path)
                    .with_context(|| format!("creating database file {db_path}"))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .with_context(|| format!("connecting to {database_url}"))?;

        info!("🗄️ Database connected: {}", db_path);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        let create_products_sql = r#"
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL DEFAULT '',
                platform TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL,
                price TEXT NOT NULL DEFAULT '',
                original_price TEXT NOT NULL DEFAULT '',
                image_url TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                rating TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                images TEXT NOT NULL DEFAULT '',
                long_description TEXT NOT NULL DEFAULT '',
                is_new BOOLEAN NOT NULL DEFAULT 0,
                is_bestseller BOOLEAN NOT NULL DEFAULT 0,
                added_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        let create_page_views_sql = r#"
            CREATE TABLE IF NOT EXISTS page_views (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL,
                product_id INTEGER,
                referrer TEXT NOT NULL DEFAULT '',
                user_agent TEXT NOT NULL DEFAULT '',
                visitor_id TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        let create_clicks_sql = r#"
            CREATE TABLE IF NOT EXISTS wa_clicks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER,
                click_type TEXT NOT NULL DEFAULT 'order',
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
        "#;

        let create_indexes_sql = r#"
            CREATE INDEX IF NOT EXISTS idx_products_category ON products (category);
            CREATE INDEX IF NOT EXISTS idx_products_added_at ON products (added_at);
            CREATE INDEX IF NOT EXISTS idx_page_views_created_at ON page_views (created_at);
            CREATE INDEX IF NOT EXISTS idx_page_views_product_id ON page_views (product_id);
            CREATE INDEX IF NOT EXISTS idx_wa_clicks_created_at ON wa_clicks (created_at);
        "#;

        sqlx::query(create_products_sql).execute(&self.pool).await?;
        sqlx::query(create_page_views_sql).execute(&self.pool).await?;
        sqlx::query(create_clicks_sql).execute(&self.pool).await?;
        sqlx::raw_sql(create_indexes_sql).execute(&self.pool).await?;

        info!("✅ Database schema ready");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_missing_database_file() -> Result<()> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("nested").join("store.db");
        let database_url = format!("sqlite:{}", db_path.to_string_lossy());

        let db = DatabaseConnection::new(&database_url).await?;

        assert!(db_path.exists());
        assert!(!db.pool().is_closed());
        Ok(())
    }

    #[tokio::test]
    async fn migrate_is_idempotent() -> Result<()> {
        let temp_dir = tempdir()?;
        let database_url = format!("sqlite:{}", temp_dir.path().join("store.db").to_string_lossy());
        let db = DatabaseConnection::new(&database_url).await?;

        db.migrate().await?;
        db.migrate().await?;

        let tables: Vec<String> = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('products', 'page_views', 'wa_clicks') ORDER BY name",
        )
        .fetch_all(db.pool())
        .await?
        .iter()
        .map(|row| row.get("name"))
        .collect();

        assert_eq!(tables, vec!["page_views", "products", "wa_clicks"]);
        Ok(())
    }
}
