//! Reverse proxy for marketplace CDN images
//!
//! Marketplace CDNs refuse hot-linked requests without a browser user agent
//! and a marketplace referer, so product images are fetched server side.
//! Only hosts on the allow-list are proxied.

use thiserror::Error;
use url::Url;

use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::scrape_error::{ScrapeError, ScrapeResult};
use crate::infrastructure::simple_http_client::{FetchedResponse, HttpClient, HttpClientConfig};

/// Host fragments of the image CDNs we proxy
pub const ALLOWED_HOST_FRAGMENTS: [&str; 4] = ["images.meesho.com", "m.media-amazon.com", "rukminim", "img.fkcdn"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyRejection {
    #[error("missing url")]
    MissingUrl,

    #[error("invalid url")]
    InvalidUrl,

    #[error("domain not allowed")]
    DomainNotAllowed,
}

/// Parse the requested URL and check it against the allow-list
pub fn allowed_image_url(raw: &str) -> Result<Url, ProxyRejection> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ProxyRejection::MissingUrl);
    }
    let url = Url::parse(raw).map_err(|_| ProxyRejection::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyRejection::InvalidUrl);
    }
    let host = url.host_str().unwrap_or_default().to_lowercase();
    if ALLOWED_HOST_FRAGMENTS.iter().any(|fragment| host.contains(fragment)) {
        Ok(url)
    } else {
        Err(ProxyRejection::DomainNotAllowed)
    }
}

#[derive(Clone)]
pub struct ImageProxy {
    client: HttpClient,
}

impl ImageProxy {
    pub fn new(config: &ScraperConfig) -> ScrapeResult<Self> {
        Ok(Self {
            client: HttpClient::with_config(HttpClientConfig::image_proxy(config))?,
        })
    }

    /// Fetch an allow-listed image; upstream error statuses become errors
    pub async fn fetch(&self, url: &Url) -> ScrapeResult<FetchedResponse> {
        let response = self.client.fetch(url.as_str()).await?;
        if !response.status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: response.status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}
