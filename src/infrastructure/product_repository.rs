use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::domain::product::{NewProduct, Product, title_key};

const PRODUCT_COLUMNS: &str = "id, url, platform, title, price, original_price, image_url, description, \
     rating, category, images, long_description, is_new, is_bestseller, added_at";

/// Storefront-facing listings are capped at this many rows
const SHELF_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a product and return the stored row
    pub async fn insert(&self, product: &NewProduct) -> Result<Product> {
        let sql = format!(
            r"
            INSERT INTO products
            (url, platform, title, price, original_price, image_url, description, rating,
             category, images, long_description, is_new, is_bestseller, added_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {PRODUCT_COLUMNS}
            "
        );
        let stored = sqlx::query_as::<_, Product>(&sql)
            .bind(&product.url)
            .bind(&product.platform)
            .bind(&product.title)
            .bind(&product.price)
            .bind(&product.original_price)
            .bind(&product.image_url)
            .bind(&product.description)
            .bind(&product.rating)
            .bind(&product.category)
            .bind(&product.images)
            .bind(&product.long_description)
            .bind(product.is_new)
            .bind(product.is_bestseller)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .context("inserting product")?;

        debug!("Inserted product {} ({})", stored.id, stored.title);
        Ok(stored)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Overwrite every editable column of an existing product
    pub async fn update(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r"
            UPDATE products SET
                url = ?, platform = ?, title = ?, price = ?, original_price = ?,
                image_url = ?, description = ?, rating = ?, category = ?, images = ?,
                long_description = ?, is_new = ?, is_bestseller = ?
            WHERE id = ?
            ",
        )
        .bind(&product.url)
        .bind(&product.platform)
        .bind(&product.title)
        .bind(&product.price)
        .bind(&product.original_price)
        .bind(&product.image_url)
        .bind(&product.description)
        .bind(&product.rating)
        .bind(&product.category)
        .bind(&product.images)
        .bind(&product.long_description)
        .bind(product.is_new)
        .bind(product.is_bestseller)
        .bind(product.id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("updating product {}", product.id))?;
        Ok(())
    }

    /// Deleting a missing id is not an error
    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All products, newest first
    pub async fn list(&self) -> Result<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY added_at DESC, id DESC");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("listing products")?;
        Ok(products)
    }

    /// Substring match over title, description and category
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let like = format!("%{query}%");
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE title LIKE ? OR description LIKE ? OR category LIKE ? \
             ORDER BY added_at DESC, id DESC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&like)
            .bind(&like)
            .bind(&like)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ? ORDER BY added_at DESC, id DESC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Distinct non-empty categories, alphabetical
    pub async fn categories(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT category FROM products WHERE category != '' ORDER BY category")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|row| row.get("category")).collect())
    }

    pub async fn new_arrivals(&self) -> Result<Vec<Product>> {
        self.flagged("is_new").await
    }

    pub async fn best_sellers(&self) -> Result<Vec<Product>> {
        self.flagged("is_bestseller").await
    }

    async fn flagged(&self, column: &str) -> Result<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {column} = 1 ORDER BY added_at DESC, id DESC LIMIT ?"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(SHELF_LIMIT)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("total"))
    }

    /// Dedupe keys of every stored title
    pub async fn title_keys(&self) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT title FROM products")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|row| title_key(row.get::<&str, _>("title")))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database_connection::DatabaseConnection;
    use tempfile::TempDir;

    async fn setup() -> Result<(TempDir, ProductRepository)> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite:{}", dir.path().join("products.db").to_string_lossy());
        let db = DatabaseConnection::new(&url).await?;
        db.migrate().await?;
        Ok((dir, ProductRepository::new(db.pool().clone())))
    }

    fn new_product(title: &str, category: &str) -> NewProduct {
        NewProduct {
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            platform: "Other".into(),
            title: title.into(),
            price: "₹199".into(),
            category: category.into(),
            ..NewProduct::default()
        }
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() -> Result<()> {
        let (_dir, repo) = setup().await?;

        let stored = repo.insert(&new_product("Denim Cap", "Caps & Accessories")).await?;
        assert!(stored.id > 0);
        assert!(!stored.is_new);

        let fetched = repo.get(stored.id).await?.expect("product exists");
        assert_eq!(fetched.title, "Denim Cap");
        assert_eq!(fetched.category, "Caps & Accessories");
        assert!(repo.get(stored.id + 100).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn list_is_newest_first() -> Result<()> {
        let (_dir, repo) = setup().await?;
        let first = repo.insert(&new_product("First", "")).await?;
        let second = repo.insert(&new_product("Second", "")).await?;

        let ids: Vec<i64> = repo.list().await?.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(repo.count().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_title_description_and_category() -> Result<()> {
        let (_dir, repo) = setup().await?;
        repo.insert(&new_product("Night Lamp", "Home & Decor")).await?;
        let mut mug = new_product("Coffee Mug", "Kitchen & Dining");
        mug.description = "ceramic lamp-shaped mug".into();
        repo.insert(&mug).await?;
        repo.insert(&new_product("Beanie", "Caps & Accessories")).await?;

        assert_eq!(repo.search("lamp").await?.len(), 2);
        assert_eq!(repo.search("Caps").await?.len(), 1);
        assert!(repo.search("nothing-like-this").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_and_delete() -> Result<()> {
        let (_dir, repo) = setup().await?;
        let mut stored = repo.insert(&new_product("Hoodie", "")).await?;

        stored.is_bestseller = true;
        stored.category = "Fashion & Clothing".into();
        repo.update(&stored).await?;

        let best = repo.best_sellers().await?;
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].category, "Fashion & Clothing");
        assert!(repo.new_arrivals().await?.is_empty());
        assert_eq!(repo.categories().await?, vec!["Fashion & Clothing".to_string()]);

        repo.delete(stored.id).await?;
        repo.delete(stored.id).await?;
        assert!(repo.get(stored.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn title_keys_are_normalized() -> Result<()> {
        let (_dir, repo) = setup().await?;
        repo.insert(&new_product("  Denim CAP ", "")).await?;

        let keys = repo.title_keys().await?;
        assert!(keys.contains("denim cap"));
        Ok(())
    }
}
