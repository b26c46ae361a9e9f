//! End-to-end tests driving the router in-process

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, HOST, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use product_showcase_lib::application::state::AppState;
use product_showcase_lib::domain::product::Product;
use product_showcase_lib::infrastructure::config::ServerConfig;
use product_showcase_lib::infrastructure::database_connection::DatabaseConnection;
use product_showcase_lib::web::auth::admin_token;
use product_showcase_lib::web::build_router;

const FORM: &str = "application/x-www-form-urlencoded";

struct TestApp {
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    async fn new(admin_password: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            database_path: dir.path().join("test.db"),
            uploads_dir: dir.path().join("uploads"),
            static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/static").into(),
            admin_password: admin_password.to_string(),
            ..ServerConfig::default()
        };

        let db = DatabaseConnection::new(&config.database_url()).await.unwrap();
        db.migrate().await.unwrap();
        let state = AppState::new(config, db.pool().clone()).unwrap();

        Self {
            router: build_router(state),
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).header(HOST, "shop.test").body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&self, uri: &str, form: &str) -> Response<Body> {
        self.send(
            Request::post(uri)
                .header(CONTENT_TYPE, FORM)
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response.headers().get(LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn home_page_renders_and_issues_visitor_cookie() {
    let app = TestApp::new("").await;
    let response = app.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("vid="));
    assert!(cookie.contains("HttpOnly"));
    assert!(body_text(response).await.contains("<!DOCTYPE html>"));
}

#[tokio::test]
async fn product_page_rejects_bad_and_unknown_ids() {
    let app = TestApp::new("").await;

    let response = app.get("/product/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Invalid product ID");

    let response = app.get("/product/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Product not found");
}

#[tokio::test]
async fn admin_area_requires_login() {
    let app = TestApp::new("secret").await;

    let response = app.get("/admin").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/admin/login");

    let response = app.post_form("/api/add", "mode=manual&title=Cap").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({ "error": "unauthorized" }));

    let response = app.get("/admin/login").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_sets_cookie_that_opens_admin() {
    let app = TestApp::new("secret").await;

    let response = app.post_form("/admin/login", "password=wrong").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/admin/login?error=Wrong+password");

    let response = app.post_form("/admin/login", "password=secret").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/admin");
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    let token = admin_token("secret");
    assert!(cookie.starts_with(&format!("admin_token={token}")));
    assert!(cookie.contains("SameSite=Lax"));

    let response = app
        .send(
            Request::get("/admin")
                .header(COOKIE, format!("admin_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/admin/logout").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn product_crud_through_api() {
    let app = TestApp::new("").await;

    let response = app.post_form("/api/add", "mode=manual&title=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Title is required");

    let response = app.post_form("/api/add", "url=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "URL is required");

    let response = app
        .post_form(
            "/api/add",
            "mode=manual&title=Embroidered+Baseball+Cap&price=%E2%82%B9299&url=https%3A%2F%2Fwww.flipkart.com%2Fcap",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["ok"], true);
    assert_eq!(created["product"]["platform"], "Flipkart");
    assert_eq!(created["product"]["category"], "Caps & Accessories");
    let id = created["product"]["id"].as_i64().unwrap();

    let response = app
        .post_form(&format!("/api/update/{id}"), "price=%E2%82%B9249&is_bestseller=1")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["product"]["price"], "₹249");
    assert_eq!(updated["product"]["is_bestseller"], true);
    assert_eq!(updated["product"]["title"], "Embroidered Baseball Cap");

    let response = app.get(&format!("/product/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Embroidered Baseball Cap"));

    let products = body_json(app.get("/api/products").await).await;
    assert_eq!(products.as_array().unwrap().len(), 1);

    let response = app.post_form("/api/update/999", "price=1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.post_form("/api/update/x", "price=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post_form(&format!("/api/delete/{id}"), "").await;
    assert_eq!(body_json(response).await, json!({ "ok": true }));
    let response = app.get(&format!("/api/product/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manual_add_keeps_gallery_and_page_shares_absolute_url() {
    let app = TestApp::new("").await;

    let response = app
        .post_form(
            "/api/add",
            "mode=manual&title=Silk+Scarf&images=%5B%22a.jpg%22%2C%22b.jpg%22%5D",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let id = body_json(response).await["product"]["id"].as_i64().unwrap();

    let stored = body_json(app.get(&format!("/api/product/{id}")).await).await;
    let product: Product = serde_json::from_value(stored).unwrap();
    assert_eq!(product.image_list(), vec!["a.jpg".to_string(), "b.jpg".to_string()]);

    let page = body_text(app.get(&format!("/product/{id}")).await).await;
    assert!(page.contains(&format!("/api/qr?url=https%3A%2F%2Fshop.test%2Fproduct%2F{id}&amp;size=160")));
}

#[tokio::test]
async fn json_import_skips_duplicates() {
    let app = TestApp::new("").await;
    let payload = json!([
        { "name": "LED Moon Lamp", "price": 349, "catalog_price": 499, "category": "Night Lamps", "images": ["https://images.meesho.com/a.jpg"] },
        { "name": "led moon lamp ", "price": 349 },
        { "name": "Steel Sipper Bottle", "price": 199 }
    ]);

    let response = app
        .send(
            Request::post("/api/bulk-import/json")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "ok": true, "imported": 2, "skipped": 1, "total": 3 })
    );

    let response = app
        .send(
            Request::post("/api/bulk-import/json")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid JSON: "));

    let response = app.get("/category/Home%20%26%20Decor?sort=price-asc").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("LED Moon Lamp"));
}

#[tokio::test]
async fn import_status_is_idle_before_first_run() {
    let app = TestApp::new("").await;
    let status = body_json(app.get("/api/bulk-import/status").await).await;
    assert_eq!(status["running"], false);
    assert!(status["started_at"].is_null());
    assert!(status.get("products").is_none());
}

#[tokio::test]
async fn sitemap_and_robots_use_request_host() {
    let app = TestApp::new("").await;
    app.post_form("/api/add", "mode=manual&title=Gel+Nail+Polish").await;

    let response = app.get("/sitemap.xml").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap(),
        "application/xml; charset=utf-8"
    );
    let xml = body_text(response).await;
    assert!(xml.contains("<loc>https://shop.test/</loc>"));
    assert!(xml.contains("<loc>https://shop.test/product/1</loc>"));
    assert!(xml.contains("<loc>https://shop.test/search?q=Nails+%26+Beauty</loc>"));

    let robots = body_text(app.get("/robots.txt").await).await;
    assert!(robots.contains("Disallow: /admin"));
    assert!(robots.contains("Sitemap: https://shop.test/sitemap.xml"));
}

#[tokio::test]
async fn qr_endpoint_returns_png() {
    let app = TestApp::new("").await;

    let response = app.get("/api/qr?url=https%3A%2F%2Fshop.test%2Fproduct%2F1&size=128").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "image/png");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

    let response = app.get("/api/qr").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn image_proxy_rejects_before_fetching() {
    let app = TestApp::new("").await;

    assert_eq!(app.get("/img").await.status(), StatusCode::BAD_REQUEST);
    let response = app.get("/img?url=https%3A%2F%2Fevil.example%2Fa.jpg").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "domain not allowed");
}

#[tokio::test]
async fn click_tracking_accepts_anything() {
    let app = TestApp::new("secret").await;
    let response = app.post_form("/api/wa-click", "product_id=abc&type=").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));
}

fn multipart(file_name: &str, content: &str) -> Request<Body> {
    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n--{boundary}--\r\n"
    );
    Request::post("/api/upload")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn uploads_are_stored_and_served() {
    let app = TestApp::new("").await;

    let response = app.send(multipart("payload.exe", "MZ")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Only jpg, png, gif, webp allowed");

    let response = app.send(multipart("photo.png", "not really a png")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded = body_json(response).await;
    let url = uploaded["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

    let response = app.get(&url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "not really a png");
}
