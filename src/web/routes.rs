//! Route table

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::application::state::AppState;
use crate::web::{api, auth, import, media, pages, seo};

/// Request body cap, sized for image uploads
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Pages and endpoints behind the admin password
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin", get(pages::admin))
        .route("/admin/analytics", get(pages::analytics))
        .route("/api/add", post(api::add_product))
        .route("/api/update/:id", post(api::update_product))
        .route("/api/delete/:id", post(api::delete_product))
        .route("/api/upload", post(media::upload_image))
        .route("/api/bulk-import", post(import::start_bulk_import))
        .route("/api/bulk-import/json", post(import::import_json))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/product/:id", get(pages::product_detail))
        .route("/search", get(pages::search))
        .route("/category/:name", get(pages::category))
        .route("/admin/login", get(auth::login_page).post(auth::login))
        .route("/admin/logout", get(auth::logout))
        .route("/api/wa-click", post(api::wa_click))
        .route("/api/products", get(api::list_products))
        .route("/api/product/:id", get(api::get_product))
        .route("/api/qr", get(media::qr_code))
        .route("/api/bulk-import/status", get(import::bulk_import_status))
        .route("/img", get(media::image_proxy))
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/robots.txt", get(seo::robots))
}

/// Build the complete application router
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let uploads_dir = state.config.uploads_dir.clone();

    Router::new()
        .merge(public_routes())
        .merge(admin_routes(&state))
        .route_service("/ads.txt", ServeFile::new(static_dir.join("ads.txt")))
        .nest_service("/static", ServeDir::new(static_dir))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
