//! HTTP client for page scraping and the image proxy
//!
//! Each client is built for one browsing profile (desktop product pages,
//! mobile store pages, image fetches) with a fixed timeout, a fixed set of
//! browser-like headers and a cap on how much of a body is read.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::{debug, info};

use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::scrape_error::ScrapeResult;

const IMAGE_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for one HTTP client profile
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Bytes read from a response body before the rest is discarded
    pub max_body_bytes: usize,
    pub accept: String,
    pub accept_language: Option<String>,
    pub referer: Option<String>,
}

impl HttpClientConfig {
    /// Desktop browser profile used for single product pages
    pub fn product_page(scraper: &ScraperConfig) -> Self {
        Self {
            timeout_seconds: scraper.page_timeout_secs,
            user_agent: scraper.desktop_user_agent.clone(),
            max_body_bytes: scraper.page_max_bytes,
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            accept_language: Some("en-US,en;q=0.9,hi;q=0.8".to_string()),
            referer: None,
        }
    }

    /// Mobile browser profile used for marketplace store pages
    pub fn store_page(scraper: &ScraperConfig) -> Self {
        Self {
            timeout_seconds: scraper.store_timeout_secs,
            user_agent: scraper.mobile_user_agent.clone(),
            max_body_bytes: scraper.store_max_bytes,
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            accept_language: Some("en-US,en;q=0.9".to_string()),
            referer: None,
        }
    }

    /// Image fetches for the reverse proxy; CDNs expect a marketplace referer
    pub fn image_proxy(scraper: &ScraperConfig) -> Self {
        Self {
            timeout_seconds: scraper.proxy_timeout_secs,
            user_agent: scraper.desktop_user_agent.clone(),
            max_body_bytes: IMAGE_MAX_BYTES,
            accept: "image/*,*/*".to_string(),
            accept_language: None,
            referer: Some("https://www.meesho.com/".to_string()),
        }
    }
}

/// A fetched response, body truncated at the profile's limit
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client bound to a single profile
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> ScrapeResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept));
        if let Some(language) = &config.accept_language {
            headers.insert(ACCEPT_LANGUAGE, header_value(language));
        }
        if let Some(referer) = &config.referer {
            headers.insert(REFERER, header_value(referer));
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client, config })
    }

    /// GET a URL and read at most `max_body_bytes` of the body; any status is returned
    pub async fn fetch(&self, url: &str) -> ScrapeResult<FetchedResponse> {
        info!("🌐 HTTP GET: {}", url);
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let remaining = self.config.max_body_bytes.saturating_sub(body.len());
            if remaining == 0 {
                debug!("Body of {} truncated at {} bytes", url, self.config.max_body_bytes);
                break;
            }
            body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
        }

        debug!("Fetched {} ({} bytes, status {})", url, body.len(), status);
        Ok(FetchedResponse {
            status,
            content_type,
            body,
        })
    }

    /// GET a page and return its body as text
    pub async fn fetch_html_string(&self, url: &str) -> ScrapeResult<String> {
        Ok(self.fetch(url).await?.text())
    }
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("*/*"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_follow_scraper_config() {
        let scraper = ScraperConfig::default();

        let page = HttpClientConfig::product_page(&scraper);
        assert_eq!(page.timeout_seconds, 15);
        assert_eq!(page.max_body_bytes, 2 * 1024 * 1024);
        assert!(page.user_agent.contains("Windows"));

        let store = HttpClientConfig::store_page(&scraper);
        assert_eq!(store.timeout_seconds, 30);
        assert!(store.user_agent.contains("Android"));

        let proxy = HttpClientConfig::image_proxy(&scraper);
        assert_eq!(proxy.referer.as_deref(), Some("https://www.meesho.com/"));
    }

    #[test]
    fn client_builds_for_every_profile() {
        let scraper = ScraperConfig::default();
        assert!(HttpClient::with_config(HttpClientConfig::product_page(&scraper)).is_ok());
        assert!(HttpClient::with_config(HttpClientConfig::store_page(&scraper)).is_ok());
        assert!(HttpClient::with_config(HttpClientConfig::image_proxy(&scraper)).is_ok());
    }
}
