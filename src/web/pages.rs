//! HTML page handlers
//!
//! Storefront pages record a page view in the background and make sure the
//! visitor carries a `vid` cookie so unique visitors can be counted.

use axum::extract::{Path, Query, State};
use axum::http::header::{REFERER, USER_AGENT};
use axum::http::{HeaderMap, HeaderName, StatusCode, Uri};
use axum::response::Html;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::application::state::AppState;
use crate::domain::analytics::PageView;
use crate::domain::catalog::SortOrder;
use crate::web::error::PageError;
use crate::web::seo::request_base;
use crate::web::views;

pub const VISITOR_COOKIE: &str = "vid";
const VISITOR_COOKIE_DAYS: i64 = 365;

type PageResult = Result<(CookieJar, Html<String>), PageError>;

/// Request details needed to record a view
struct ViewContext {
    jar: CookieJar,
    visitor_id: String,
    path: String,
    referrer: String,
    user_agent: String,
}

impl ViewContext {
    fn new(jar: CookieJar, uri: &Uri, headers: &HeaderMap) -> Self {
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        let (jar, visitor_id) = match jar.get(VISITOR_COOKIE).map(|c| c.value().to_string()) {
            Some(id) if !id.is_empty() => (jar, id),
            _ => {
                let id = Uuid::new_v4().to_string();
                let cookie = Cookie::build((VISITOR_COOKIE, id.clone()))
                    .path("/")
                    .max_age(time::Duration::days(VISITOR_COOKIE_DAYS))
                    .http_only(true)
                    .same_site(SameSite::Lax);
                (jar.add(cookie), id)
            }
        };

        Self {
            jar,
            visitor_id,
            path: uri.path().to_string(),
            referrer: header(REFERER),
            user_agent: header(USER_AGENT),
        }
    }

    /// Record the view without delaying the response; returns the cookie jar to send back
    fn track(self, state: &AppState, product_id: Option<i64>) -> CookieJar {
        let view = PageView {
            path: self.path,
            product_id,
            referrer: self.referrer,
            user_agent: self.user_agent,
            visitor_id: self.visitor_id,
        };
        let analytics = state.analytics.clone();
        tokio::spawn(async move {
            if let Err(e) = analytics.insert_view(&view).await {
                warn!("Failed to record page view: {:#}", e);
            }
        });
        self.jar
    }
}

pub async fn home(State(state): State<AppState>, jar: CookieJar, uri: Uri, headers: HeaderMap) -> PageResult {
    let jar = ViewContext::new(jar, &uri, &headers).track(&state, None);
    let page = state.catalog.home_page().await?;
    Ok((jar, Html(views::storefront::home(&page))))
}

pub async fn product_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
    uri: Uri,
    headers: HeaderMap,
) -> PageResult {
    let id: i64 = id
        .parse()
        .map_err(|_| PageError::new(StatusCode::BAD_REQUEST, "Invalid product ID"))?;

    let jar = ViewContext::new(jar, &uri, &headers).track(&state, Some(id));
    let page = state
        .catalog
        .product_page(id)
        .await?
        .ok_or_else(|| PageError::new(StatusCode::NOT_FOUND, "Product not found"))?;

    Ok((jar, Html(views::storefront::product(&page, &request_base(&headers)))))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    jar: CookieJar,
    uri: Uri,
    headers: HeaderMap,
) -> PageResult {
    let jar = ViewContext::new(jar, &uri, &headers).track(&state, None);
    let products = state.catalog.search(&query.q).await?;
    Ok((jar, Html(views::storefront::search(&query.q, &products))))
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub sort: Option<String>,
}

pub async fn category(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CategoryQuery>,
    jar: CookieJar,
    uri: Uri,
    headers: HeaderMap,
) -> PageResult {
    let jar = ViewContext::new(jar, &uri, &headers).track(&state, None);
    let sort = SortOrder::from_query(query.sort.as_deref());
    let page = state.catalog.category_page(&name, sort).await?;
    Ok((jar, Html(views::storefront::category(&page))))
}

pub async fn admin(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let products = state.products.list().await?;
    Ok(Html(views::admin::products(&products)))
}

pub async fn analytics(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let summary = state.catalog.analytics_summary().await?;
    Ok(Html(views::admin::analytics(&summary)))
}
