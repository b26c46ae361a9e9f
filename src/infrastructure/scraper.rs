//! Best-effort product metadata scraper
//!
//! Product pages are fetched with a desktop browser profile and mined for
//! Open Graph / Twitter meta tags, the `<title>` element, and price or rating
//! hints in embedded JSON-LD. Every field has an ordered list of fallbacks; a
//! page that yields nothing still produces a product titled after its platform.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::domain::catalog::{Platform, detect_platform};
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};
use crate::infrastructure::simple_http_client::{HttpClient, HttpClientConfig};

/// Meta tag shapes: the key-first pair is tried before the content-first pair
static META_KEY_FIRST: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        compile(r#"<meta[^>]+property=["']([^"']+)["'][^>]+content=["']([^"']*)["']"#),
        compile(r#"<meta[^>]+name=["']([^"']+)["'][^>]+content=["']([^"']*)["']"#),
    ]
});

static META_CONTENT_FIRST: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        compile(r#"<meta[^>]+content=["']([^"']*)["'][^>]+property=["']([^"']+)["']"#),
        compile(r#"<meta[^>]+content=["']([^"']*)["'][^>]+name=["']([^"']+)["']"#),
    ]
});

static JSON_LD_PRICE: Lazy<Regex> = Lazy::new(|| compile(r#""price"\s*:\s*"?([\d,.]+)"?"#));
static CURRENCY_PRICE: Lazy<Regex> = Lazy::new(|| compile(r"[₹$]\s*([\d,]+\.?\d*)"));
static RATING_TEXT: Lazy<Regex> = Lazy::new(|| compile(r"([\d.]+)\s*(?:out of|/)\s*5"));
static JSON_LD_RATING: Lazy<Regex> = Lazy::new(|| compile(r#""ratingValue"\s*:\s*"?([\d.]+)"?"#));
static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| compile(r"&(amp|lt|gt|quot|#39|#x27|nbsp);"));

/// Marketplace branding removed from page titles
const TITLE_SUFFIXES: [&str; 10] = [
    " | Meesho",
    " - Meesho",
    ": Buy Online",
    " | Amazon.in",
    " - Amazon.in",
    ": Amazon.in",
    " | Flipkart",
    " - Flipkart.com",
    "Amazon.in:",
    "Amazon.in :",
];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static scraper pattern")
}

/// Fields recovered from a product page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapedProduct {
    pub url: String,
    pub platform: String,
    pub title: String,
    pub price: String,
    pub original_price: String,
    pub image_url: String,
    pub description: String,
    pub rating: String,
}

/// Fetches product pages and extracts their metadata
#[derive(Clone)]
pub struct MetadataScraper {
    client: HttpClient,
}

impl MetadataScraper {
    pub fn new(config: &ScraperConfig) -> ScrapeResult<Self> {
        Ok(Self {
            client: HttpClient::with_config(HttpClientConfig::product_page(config))?,
        })
    }

    /// Fetch `raw_url` and extract whatever metadata the page exposes
    pub async fn scrape(&self, raw_url: &str) -> ScrapeResult<ScrapedProduct> {
        let url = validate_url(raw_url)?;
        let platform = detect_platform(&url);

        info!("🔍 Scraping {} product page: {}", platform, url);
        let body = self.client.fetch_html_string(&url).await?;

        let product = extract_product_info(&url, platform, &body);
        debug!(
            "Extracted title={:?} price={:?} image={:?}",
            product.title, product.price, product.image_url
        );
        Ok(product)
    }
}

/// Trimmed URL, accepted only with an http(s) scheme
pub fn validate_url(raw_url: &str) -> ScrapeResult<String> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(ScrapeError::EmptyUrl);
    }
    let parsed = Url::parse(trimmed).map_err(|e| ScrapeError::invalid_url(trimmed, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::invalid_url(trimmed, "only http and https URLs are supported"));
    }
    Ok(trimmed.to_string())
}

/// Pure extraction over an already fetched page body
pub fn extract_product_info(url: &str, platform: Platform, body: &str) -> ScrapedProduct {
    let title = first_non_empty(&[
        extract_meta(body, "og:title"),
        extract_meta(body, "twitter:title"),
        extract_tag(body, "<title>", "</title>"),
    ]);
    let description = first_non_empty(&[
        extract_meta(body, "og:description"),
        extract_meta(body, "description"),
        extract_meta(body, "twitter:description"),
    ]);
    let image_url = first_non_empty(&[extract_meta(body, "og:image"), extract_meta(body, "twitter:image")]);
    let price = first_non_empty(&[
        extract_meta(body, "og:price:amount"),
        extract_meta(body, "product:price:amount"),
        extract_price_from_body(body),
    ]);
    let original_price = first_non_empty(&[extract_meta(body, "product:original_price:amount")]);

    let mut title = clean_title(&title);
    if title.is_empty() {
        title = format!("Product from {platform}");
    }

    ScrapedProduct {
        url: url.to_string(),
        platform: platform.to_string(),
        title,
        price,
        original_price,
        image_url,
        description,
        rating: extract_rating(body),
    }
}

/// Content of the first meta tag whose property or name equals `prop` (case-insensitive)
pub fn extract_meta(body: &str, prop: &str) -> String {
    let wanted = prop.to_lowercase();

    for pattern in META_KEY_FIRST.iter() {
        for caps in pattern.captures_iter(body) {
            if caps[1].to_lowercase() == wanted {
                return html_decode(&caps[2]).trim().to_string();
            }
        }
    }
    for pattern in META_CONTENT_FIRST.iter() {
        for caps in pattern.captures_iter(body) {
            if caps[2].to_lowercase() == wanted {
                return html_decode(&caps[1]).trim().to_string();
            }
        }
    }
    String::new()
}

/// Text between the first `open` marker and the following `close` marker
pub fn extract_tag(body: &str, open: &str, close: &str) -> String {
    let Some(start) = body.find(open) else {
        return String::new();
    };
    let rest = &body[start + open.len()..];
    match rest.find(close) {
        Some(end) => html_decode(&rest[..end]).trim().to_string(),
        None => String::new(),
    }
}

/// JSON-LD price first, then the first currency amount in the page
pub fn extract_price_from_body(body: &str) -> String {
    JSON_LD_PRICE
        .captures(body)
        .or_else(|| CURRENCY_PRICE.captures(body))
        .map(|caps| format!("₹{}", &caps[1]))
        .unwrap_or_default()
}

pub fn extract_rating(body: &str) -> String {
    RATING_TEXT
        .captures(body)
        .or_else(|| JSON_LD_RATING.captures(body))
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

pub fn clean_title(title: &str) -> String {
    TITLE_SUFFIXES
        .iter()
        .fold(title.to_string(), |acc, suffix| acc.replace(suffix, ""))
        .trim()
        .to_string()
}

/// Decode the common entities in one left-to-right pass; decoded text is not rescanned
pub fn html_decode(s: &str) -> String {
    HTML_ENTITY
        .replace_all(s, |caps: &regex::Captures| match &caps[1] {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            "#39" | "#x27" => "'",
            _ => " ",
        })
        .into_owned()
}

pub fn first_non_empty(values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}
