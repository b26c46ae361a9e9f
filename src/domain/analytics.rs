use serde::{Deserialize, Serialize};

/// Click type recorded when the client does not send one
pub const DEFAULT_CLICK_TYPE: &str = "order";

/// One tracked page render
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageView {
    pub path: String,
    pub product_id: Option<i64>,
    pub referrer: String,
    pub user_agent: String,
    pub visitor_id: String,
}

/// "Order on chat" style click reported by the storefront scripts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub product_id: Option<i64>,
    pub click_type: String,
}

impl ClickEvent {
    /// Build an event from raw form values; bad ids are dropped
    pub fn from_form(product_id: Option<&str>, click_type: Option<&str>) -> Self {
        let product_id = product_id
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<i64>().ok());
        let click_type = match click_type {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_CLICK_TYPE.to_string(),
        };
        Self { product_id, click_type }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyViews {
    pub day: String,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: i64,
    pub title: String,
    pub views: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickTypeCount {
    pub click_type: String,
    pub clicks: i64,
}

/// Headline numbers shown on the home page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteStats {
    pub total_views: i64,
    pub unique_visitors: i64,
    pub clicks: i64,
}

/// Everything the analytics dashboard renders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub today_views: i64,
    pub total_clicks: i64,
    pub today_clicks: i64,
    pub unique_visitors: i64,
    pub clicks_by_type: Vec<ClickTypeCount>,
    pub views_per_day: Vec<DailyViews>,
    pub top_products: Vec<TopProduct>,
    pub product_count: i64,
}

impl AnalyticsSummary {
    /// Largest daily count, used to scale the dashboard bars
    pub fn peak_daily_views(&self) -> i64 {
        self.views_per_day.iter().map(|d| d.views).max().unwrap_or(0)
    }
}
