//! JSON API for the admin panel and the storefront scripts

use axum::Form;
use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::application::state::AppState;
use crate::domain::analytics::ClickEvent;
use crate::domain::catalog::{Platform, auto_category, detect_platform};
use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::web::error::ApiError;

type ApiResult<T = Json<Value>> = Result<T, ApiError>;

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("Invalid ID"))
}

/// Form posted by both "add by URL" and "add manually"
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddProductForm {
    pub mode: String,
    pub url: String,
    pub title: String,
    pub platform: String,
    pub price: String,
    pub original_price: String,
    pub image_url: String,
    pub description: String,
    pub rating: String,
    pub category: String,
    /// JSON array of gallery image URLs
    pub images: String,
    pub long_description: String,
}

impl AddProductForm {
    fn into_manual_product(self) -> Result<NewProduct, ApiError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::bad_request("Title is required"));
        }

        let url = self.url.trim().to_string();
        let platform = match self.platform.trim() {
            "" if url.is_empty() => Platform::Other.as_str().to_string(),
            "" => detect_platform(&url).as_str().to_string(),
            given => given.to_string(),
        };
        let category = if self.category.trim().is_empty() {
            auto_category(&title)
        } else {
            self.category.trim().to_string()
        };

        Ok(NewProduct {
            url,
            platform,
            title,
            price: self.price.trim().to_string(),
            original_price: self.original_price.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            description: self.description,
            rating: self.rating.trim().to_string(),
            category,
            images: self.images.trim().to_string(),
            long_description: self.long_description,
            ..NewProduct::default()
        })
    }
}

/// POST /api/add
pub async fn add_product(State(state): State<AppState>, Form(form): Form<AddProductForm>) -> ApiResult {
    let new_product = if form.mode == "manual" {
        form.into_manual_product()?
    } else {
        let url = form.url.trim();
        if url.is_empty() {
            return Err(ApiError::bad_request("URL is required"));
        }
        let scraped = state
            .scraper
            .scrape(url)
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to scrape: {e}")))?;

        NewProduct {
            category: auto_category(&scraped.title),
            url: scraped.url,
            platform: scraped.platform,
            title: scraped.title,
            price: scraped.price,
            original_price: scraped.original_price,
            image_url: scraped.image_url,
            description: scraped.description,
            rating: scraped.rating,
            ..NewProduct::default()
        }
    };

    let product = state
        .products
        .insert(&new_product)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to save: {e:#}")))?;

    info!("➕ Added product {} ({})", product.id, product.title);
    Ok(Json(json!({ "ok": true, "product": product })))
}

/// POST /api/update/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(patch): Form<ProductPatch>,
) -> ApiResult {
    let id = parse_id(&id)?;
    let current = state
        .products
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let updated = patch.apply(&current);
    state
        .products
        .update(&updated)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to update: {e:#}")))?;

    Ok(Json(json!({ "ok": true, "product": updated })))
}

/// POST /api/delete/:id
pub async fn delete_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = parse_id(&id)?;
    state.products.delete(id).await?;
    info!("🗑️ Deleted product {}", id);
    Ok(Json(json!({ "ok": true })))
}

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.products.list().await?))
}

/// GET /api/product/:id
pub async fn get_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    let id = parse_id(&id)?;
    state
        .products
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

#[derive(Debug, Default, Deserialize)]
pub struct ClickForm {
    pub product_id: Option<String>,
    #[serde(rename = "type")]
    pub click_type: Option<String>,
}

/// POST /api/wa-click
pub async fn wa_click(State(state): State<AppState>, Form(form): Form<ClickForm>) -> Json<Value> {
    let event = ClickEvent::from_form(form.product_id.as_deref(), form.click_type.as_deref());
    if let Err(e) = state.analytics.insert_click(&event).await {
        warn!("Failed to record click: {:#}", e);
    }
    Json(json!({ "ok": true }))
}
