use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};

use crate::domain::analytics::{
    AnalyticsSummary, ClickEvent, ClickTypeCount, DailyViews, PageView, SiteStats, TopProduct,
};

const TOP_PRODUCTS_LIMIT: i64 = 10;

/// Page views and click events
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_view(&self, view: &PageView) -> Result<()> {
        sqlx::query(
            "INSERT INTO page_views (path, product_id, referrer, user_agent, visitor_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&view.path)
        .bind(view.product_id)
        .bind(&view.referrer)
        .bind(&view.user_agent)
        .bind(&view.visitor_id)
        .execute(&self.pool)
        .await
        .with_context(|| format!("recording view of {}", view.path))?;
        Ok(())
    }

    pub async fn insert_click(&self, click: &ClickEvent) -> Result<()> {
        sqlx::query("INSERT INTO wa_clicks (product_id, click_type) VALUES (?, ?)")
            .bind(click.product_id)
            .bind(&click.click_type)
            .execute(&self.pool)
            .await
            .context("recording click")?;
        Ok(())
    }

    async fn scalar(&self, sql: &str) -> Result<i64> {
        let row = sqlx::query(sql).fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    pub async fn total_views(&self) -> Result<i64> {
        self.scalar("SELECT COUNT(*) FROM page_views").await
    }

    pub async fn today_views(&self) -> Result<i64> {
        self.scalar("SELECT COUNT(*) FROM page_views WHERE date(created_at) = date('now')")
            .await
    }

    pub async fn unique_visitors(&self) -> Result<i64> {
        self.scalar("SELECT COUNT(DISTINCT visitor_id) FROM page_views WHERE visitor_id != ''")
            .await
    }

    pub async fn total_clicks(&self) -> Result<i64> {
        self.scalar("SELECT COUNT(*) FROM wa_clicks").await
    }

    pub async fn today_clicks(&self) -> Result<i64> {
        self.scalar("SELECT COUNT(*) FROM wa_clicks WHERE date(created_at) = date('now')")
            .await
    }

    pub async fn clicks_by_type(&self) -> Result<Vec<ClickTypeCount>> {
        let rows = sqlx::query(
            "SELECT click_type, COUNT(*) AS clicks FROM wa_clicks GROUP BY click_type ORDER BY clicks DESC, click_type",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ClickTypeCount {
                click_type: row.get("click_type"),
                clicks: row.get("clicks"),
            })
            .collect())
    }

    /// Daily view counts for the last 30 days, oldest first
    pub async fn views_per_day(&self) -> Result<Vec<DailyViews>> {
        let rows = sqlx::query(
            r"
            SELECT date(created_at) AS day, COUNT(*) AS views
            FROM page_views
            WHERE created_at >= datetime('now', '-30 days')
            GROUP BY day
            ORDER BY day
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| DailyViews {
                day: row.get("day"),
                views: row.get("views"),
            })
            .collect())
    }

    /// Most viewed products that still exist
    pub async fn top_products(&self) -> Result<Vec<TopProduct>> {
        let rows = sqlx::query(
            r"
            SELECT pv.product_id AS product_id, p.title AS title, COUNT(*) AS views
            FROM page_views pv
            JOIN products p ON p.id = pv.product_id
            WHERE pv.product_id IS NOT NULL
            GROUP BY pv.product_id
            ORDER BY views DESC, pv.product_id
            LIMIT ?
            ",
        )
        .bind(TOP_PRODUCTS_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TopProduct {
                product_id: row.get("product_id"),
                title: row.get("title"),
                views: row.get("views"),
            })
            .collect())
    }

    pub async fn site_stats(&self) -> Result<SiteStats> {
        Ok(SiteStats {
            total_views: self.total_views().await?,
            unique_visitors: self.unique_visitors().await?,
            clicks: self.total_clicks().await?,
        })
    }

    /// Everything the dashboard shows; `product_count` is filled in by the caller
    pub async fn summary(&self) -> Result<AnalyticsSummary> {
        Ok(AnalyticsSummary {
            total_views: self.total_views().await?,
            today_views: self.today_views().await?,
            total_clicks: self.total_clicks().await?,
            today_clicks: self.today_clicks().await?,
            unique_visitors: self.unique_visitors().await?,
            clicks_by_type: self.clicks_by_type().await?,
            views_per_day: self.views_per_day().await?,
            top_products: self.top_products().await?,
            product_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::NewProduct;
    use crate::infrastructure::database_connection::DatabaseConnection;
    use crate::infrastructure::product_repository::ProductRepository;
    use tempfile::TempDir;

    async fn setup() -> Result<(TempDir, AnalyticsRepository, ProductRepository)> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite:{}", dir.path().join("analytics.db").to_string_lossy());
        let db = DatabaseConnection::new(&url).await?;
        db.migrate().await?;
        let pool = db.pool().clone();
        Ok((dir, AnalyticsRepository::new(pool.clone()), ProductRepository::new(pool)))
    }

    fn view(path: &str, product_id: Option<i64>, visitor: &str) -> PageView {
        PageView {
            path: path.into(),
            product_id,
            visitor_id: visitor.into(),
            ..PageView::default()
        }
    }

    #[tokio::test]
    async fn counts_views_and_unique_visitors() -> Result<()> {
        let (_dir, analytics, _) = setup().await?;
        analytics.insert_view(&view("/", None, "a")).await?;
        analytics.insert_view(&view("/", None, "a")).await?;
        analytics.insert_view(&view("/search", None, "b")).await?;
        analytics.insert_view(&view("/", None, "")).await?;

        assert_eq!(analytics.total_views().await?, 4);
        assert_eq!(analytics.today_views().await?, 4);
        assert_eq!(analytics.unique_visitors().await?, 2);

        let days = analytics.views_per_day().await?;
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].views, 4);
        Ok(())
    }

    #[tokio::test]
    async fn clicks_group_by_type() -> Result<()> {
        let (_dir, analytics, _) = setup().await?;
        analytics.insert_click(&ClickEvent::from_form(Some("1"), None)).await?;
        analytics.insert_click(&ClickEvent::from_form(None, Some("order"))).await?;
        analytics.insert_click(&ClickEvent::from_form(None, Some("share"))).await?;

        assert_eq!(analytics.total_clicks().await?, 3);
        assert_eq!(analytics.today_clicks().await?, 3);

        let by_type = analytics.clicks_by_type().await?;
        assert_eq!(by_type[0].click_type, "order");
        assert_eq!(by_type[0].clicks, 2);
        assert_eq!(by_type[1].click_type, "share");
        Ok(())
    }

    #[tokio::test]
    async fn top_products_join_titles() -> Result<()> {
        let (_dir, analytics, products) = setup().await?;
        let lamp = products
            .insert(&NewProduct {
                title: "Night Lamp".into(),
                ..NewProduct::default()
            })
            .await?;
        let mug = products
            .insert(&NewProduct {
                title: "Mug".into(),
                ..NewProduct::default()
            })
            .await?;

        for _ in 0..3 {
            analytics.insert_view(&view("/product", Some(lamp.id), "v")).await?;
        }
        analytics.insert_view(&view("/product", Some(mug.id), "v")).await?;
        analytics.insert_view(&view("/product", Some(9999), "v")).await?;

        let top = analytics.top_products().await?;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].title, "Night Lamp");
        assert_eq!(top[0].views, 3);

        let summary = analytics.summary().await?;
        assert_eq!(summary.total_views, 5);
        assert_eq!(summary.peak_daily_views(), 5);
        Ok(())
    }
}
