//! Error types for page fetching, metadata extraction and store-page parsing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("empty URL")]
    EmptyUrl,

    #[error("invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Meesho blocked the request (403). Try again in a few minutes")]
    Blocked,

    #[error("Meesho blocked the request. Try again in a few minutes")]
    AccessDenied,

    #[error("could not find product data on page")]
    MissingPageData,

    #[error("failed to parse page data: {0}")]
    InvalidPageData(#[from] serde_json::Error),

    #[error("could not find listing data")]
    MissingListing,

    #[error("unexpected listing format")]
    UnexpectedListing,

    #[error("no products found")]
    NoProducts { total_count: i64 },
}

/// Failure while walking an embedded JSON document by key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JsonPathError {
    #[error("expected map at key {0}")]
    NotAnObject(String),

    #[error("key {0} not found")]
    MissingKey(String),
}

impl ScrapeError {
    /// Build an invalid URL error with the parser's reason
    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the remote site actively refused us
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked | Self::AccessDenied)
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
