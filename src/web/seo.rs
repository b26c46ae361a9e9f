use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, HOST};
use axum::response::IntoResponse;
use chrono::Utc;

use crate::application::state::AppState;
use crate::infrastructure::sitemap::{base_url, render_robots, render_sitemap};
use crate::web::error::PageError;

/// Public origin of the current request
pub(crate) fn request_base(headers: &HeaderMap) -> String {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    base_url(headers, host)
}

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>, headers: HeaderMap) -> Result<impl IntoResponse, PageError> {
    let products = state.products.list().await?;
    let xml = render_sitemap(&request_base(&headers), &products, Utc::now().date_naive());
    Ok((
        [
            (CONTENT_TYPE, "application/xml; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        xml,
    ))
}

/// GET /robots.txt
pub async fn robots(headers: HeaderMap) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_robots(&request_base(&headers)),
    )
}
