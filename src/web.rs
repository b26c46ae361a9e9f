//! HTTP surface: storefront pages, admin panel and the JSON API

pub mod api;
pub mod auth;
pub mod error;
pub mod import;
pub mod media;
pub mod pages;
pub mod routes;
pub mod seo;
pub mod views;

use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{IntoResponse, Response};

pub use error::{ApiError, PageError};
pub use routes::build_router;

/// Plain 302 redirect (axum's `Redirect` only offers 303/307/308)
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}
