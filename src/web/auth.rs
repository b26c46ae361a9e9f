//! Admin authentication
//!
//! A single shared password. After login the browser holds a cookie whose
//! value is derived from the password, so changing the password logs every
//! session out. With no password configured the admin area is open.

use axum::Form;
use axum::extract::{Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::application::state::AppState;
use crate::web::error::ApiError;
use crate::web::found;
use crate::web::views;

pub const ADMIN_COOKIE: &str = "admin_token";
const TOKEN_SALT: &str = "showcase-admin-";
const SESSION_DAYS: i64 = 7;

/// Hex of the first 16 bytes of SHA-256(salt + password)
pub fn admin_token(password: &str) -> String {
    let digest = Sha256::digest(format!("{TOKEN_SALT}{password}").as_bytes());
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

pub fn is_admin_authed(password: &str, jar: &CookieJar) -> bool {
    if password.is_empty() {
        return true;
    }
    jar.get(ADMIN_COOKIE)
        .is_some_and(|cookie| cookie.value() == admin_token(password))
}

/// Route layer guarding the admin pages and mutating API endpoints
pub async fn require_admin(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    if is_admin_authed(&state.config.admin_password, &jar) {
        return next.run(request).await;
    }

    let wants_json = request
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes() == b"application/json");
    if wants_json || request.uri().path().starts_with("/api/") {
        return ApiError::Unauthorized.into_response();
    }
    found("/admin/login")
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

pub async fn login_page(State(state): State<AppState>, jar: CookieJar, Query(query): Query<LoginQuery>) -> Response {
    let password = &state.config.admin_password;
    if password.is_empty() || is_admin_authed(password, &jar) {
        return found("/admin");
    }
    Html(views::admin::login(query.error.as_deref())).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    if form.password != state.config.admin_password {
        warn!("🔒 Failed admin login attempt");
        return found("/admin/login?error=Wrong+password");
    }

    let cookie = Cookie::build((ADMIN_COOKIE, admin_token(&form.password)))
        .path("/")
        .max_age(time::Duration::days(SESSION_DAYS))
        .http_only(true)
        .same_site(SameSite::Lax);

    info!("🔓 Admin logged in");
    (jar.add(cookie), found("/admin")).into_response()
}

pub async fn logout(jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(ADMIN_COOKIE).path("/"));
    (jar, found("/")).into_response()
}
