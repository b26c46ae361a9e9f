//! Marketplace store page parser
//!
//! Supplier pages on the marketplace are rendered by a Next.js frontend that
//! embeds the whole listing as JSON in `<script id="__NEXT_DATA__">`. The
//! listing lives under `props.pageProps.initialState.shopListing.listing`
//! on store pages and under `...hpListing.listing` on category pages; its
//! `products` field is an array of result pages, each holding `products`.

use once_cell::sync::Lazy;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::catalog::map_marketplace_category;
use crate::domain::product::NewProduct;
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::scrape_error::{JsonPathError, ScrapeError, ScrapeResult};
use crate::infrastructure::simple_http_client::{HttpClient, HttpClientConfig};

const MARKETPLACE_BASE: &str = "https://www.meesho.com";
const MARKETPLACE_PLATFORM: &str = "Meesho";

static NEXT_DATA_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script#__NEXT_DATA__[type="application/json"]"#).expect("static selector")
});

const STORE_LISTING_PATH: [&str; 5] = ["props", "pageProps", "initialState", "shopListing", "listing"];
const CATEGORY_LISTING_PATH: [&str; 5] = ["props", "pageProps", "initialState", "hpListing", "listing"];

/// One product as listed on a store page; also the item shape of JSON imports
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceProduct {
    pub meesho_id: i64,
    pub name: String,
    pub slug: String,
    pub original_slug: String,
    pub price: i64,
    pub catalog_price: i64,
    pub description: String,
    pub image: String,
    pub images: Vec<String>,
    pub category: String,
    pub rating: String,
    pub rating_count: i64,
    pub url: String,
}

impl MarketplaceProduct {
    /// Storefront record for this listing entry
    pub fn into_new_product(self) -> NewProduct {
        let images = if self.images.is_empty() {
            "[]".to_string()
        } else {
            serde_json::to_string(&self.images).unwrap_or_else(|_| "[]".to_string())
        };

        let image_url = if self.image.is_empty() {
            self.images.first().cloned().unwrap_or_default()
        } else {
            self.image
        };

        let original_price = if self.catalog_price > self.price {
            format!("₹{}", self.catalog_price)
        } else {
            String::new()
        };

        NewProduct {
            url: self.url,
            platform: MARKETPLACE_PLATFORM.to_string(),
            category: map_marketplace_category(&self.category),
            price: format!("₹{}", self.price),
            original_price,
            image_url,
            images,
            description: self.description,
            rating: self.rating,
            title: self.name,
            ..NewProduct::default()
        }
    }
}

/// Products found on a store page plus the store's advertised total
#[derive(Debug, Clone, Default)]
pub struct StorePage {
    pub products: Vec<MarketplaceProduct>,
    pub total_count: i64,
}

/// Downloads store pages with the mobile browser profile
#[derive(Clone)]
pub struct StorePageFetcher {
    client: HttpClient,
}

impl StorePageFetcher {
    pub fn new(config: &ScraperConfig) -> ScrapeResult<Self> {
        Ok(Self {
            client: HttpClient::with_config(HttpClientConfig::store_page(config))?,
        })
    }

    pub async fn fetch_store_page(&self, store_url: &str) -> ScrapeResult<StorePage> {
        info!("🏪 Fetching store page: {}", store_url);
        let response = self.client.fetch(store_url).await?;

        if response.status == StatusCode::FORBIDDEN {
            warn!("Store page request was blocked: {}", store_url);
            return Err(ScrapeError::Blocked);
        }

        parse_store_page(&response.text())
    }
}

/// Turn user input into a store URL; bare names are treated as store slugs
pub fn normalize_store_url(input: &str, default_url: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        default_url.to_string()
    } else if input.starts_with("http") {
        input.to_string()
    } else {
        format!("{MARKETPLACE_BASE}/{input}")
    }
}

pub fn parse_store_page(html: &str) -> ScrapeResult<StorePage> {
    let document = Html::parse_document(html);
    let Some(script) = document.select(&NEXT_DATA_SELECTOR).next() else {
        if html.contains("Access Denied") {
            return Err(ScrapeError::AccessDenied);
        }
        return Err(ScrapeError::MissingPageData);
    };

    let payload: String = script.text().collect();
    let data: Value = serde_json::from_str(&payload)?;

    let listing = navigate_json(&data, &STORE_LISTING_PATH)
        .or_else(|_| navigate_json(&data, &CATEGORY_LISTING_PATH))
        .map_err(|_| ScrapeError::MissingListing)?;
    let listing = listing.as_object().ok_or(ScrapeError::UnexpectedListing)?;

    let total_count = listing
        .get("productsCount")
        .and_then(Value::as_f64)
        .map_or(0, |count| count as i64);

    let pages = match listing.get("products").and_then(Value::as_array) {
        Some(pages) if !pages.is_empty() => pages,
        _ => return Err(ScrapeError::NoProducts { total_count }),
    };

    let products: Vec<MarketplaceProduct> = pages
        .iter()
        .filter_map(|page| page.get("products").and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_object)
        .map(parse_product)
        .collect();

    debug!("Parsed {} products (store reports {})", products.len(), total_count);
    Ok(StorePage { products, total_count })
}

/// Walk nested objects by key
pub fn navigate_json<'a>(data: &'a Value, keys: &[&str]) -> Result<&'a Value, JsonPathError> {
    keys.iter().try_fold(data, |current, key| {
        let object = current
            .as_object()
            .ok_or_else(|| JsonPathError::NotAnObject((*key).to_string()))?;
        object
            .get(*key)
            .ok_or_else(|| JsonPathError::MissingKey((*key).to_string()))
    })
}

pub fn parse_product(object: &Map<String, Value>) -> MarketplaceProduct {
    let text = |key: &str| object.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
    let number = |value: Option<&Value>| value.and_then(Value::as_f64).map_or(0, |v| v as i64);

    let name = text("name").trim().to_string();
    let description = match text("description").trim() {
        "" => name.clone(),
        description => description.to_string(),
    };

    let mut images: Vec<String> = object
        .get("images")
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    if images.is_empty() {
        images = object
            .get("product_images")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|image| image.get("url").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
    }

    let reviews = object.get("supplier_reviews_summary").and_then(Value::as_object);
    let rating = reviews
        .and_then(|r| r.get("average_rating_str"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let rating_count = number(reviews.and_then(|r| r.get("rating_count")));

    let slug = text("slug");
    let original_slug = text("original_slug");
    let url = if !original_slug.is_empty() {
        format!("{MARKETPLACE_BASE}/{slug}/p/{original_slug}")
    } else if !slug.is_empty() {
        format!("{MARKETPLACE_BASE}/{slug}")
    } else {
        String::new()
    };

    MarketplaceProduct {
        meesho_id: number(object.get("id")),
        name,
        slug,
        original_slug,
        price: number(object.get("min_product_price")),
        catalog_price: number(object.get("min_catalog_price")),
        description,
        image: text("image"),
        images,
        category: text("sub_sub_category_name"),
        rating,
        rating_count,
        url,
    }
}
