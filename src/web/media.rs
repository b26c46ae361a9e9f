//! Binary endpoints: image proxy, QR codes and admin image uploads

use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::state::AppState;
use crate::infrastructure::image_proxy::{ProxyRejection, allowed_image_url};
use crate::infrastructure::qr;
use crate::web::error::ApiError;

const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";
const FALLBACK_IMAGE_TYPE: &str = "image/jpeg";
const UPLOAD_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Default, Deserialize)]
pub struct ImageQuery {
    #[serde(default)]
    pub url: String,
}

/// GET /img?url=
pub async fn image_proxy(State(state): State<AppState>, Query(query): Query<ImageQuery>) -> Response {
    let url = match allowed_image_url(&query.url) {
        Ok(url) => url,
        Err(rejection) => {
            let status = match rejection {
                ProxyRejection::DomainNotAllowed => StatusCode::FORBIDDEN,
                ProxyRejection::MissingUrl | ProxyRejection::InvalidUrl => StatusCode::BAD_REQUEST,
            };
            return (status, rejection.to_string()).into_response();
        }
    };

    match state.image_proxy.fetch(&url).await {
        Ok(image) => {
            let content_type = image
                .content_type
                .unwrap_or_else(|| FALLBACK_IMAGE_TYPE.to_string());
            (
                [(CONTENT_TYPE, content_type), (CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string())],
                image.body,
            )
                .into_response()
        }
        Err(e) => {
            warn!("🖼️ Image proxy failed for {}: {}", url, e);
            (StatusCode::BAD_GATEWAY, "upstream fetch failed").into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QrQuery {
    #[serde(default)]
    pub url: String,
    pub size: Option<String>,
}

/// GET /api/qr?url=&size=
pub async fn qr_code(Query(query): Query<QrQuery>) -> Result<Response, ApiError> {
    if query.url.is_empty() {
        return Err(ApiError::bad_request("url parameter is required"));
    }
    let size = qr::clamp_size(query.size.as_deref());
    let png = qr::encode_png(&query.url, size)
        .map_err(|e| ApiError::internal(format!("Failed to generate QR code: {e:#}")))?;

    Ok((
        [(CONTENT_TYPE, "image/png"), (CACHE_CONTROL, IMAGE_CACHE_CONTROL)],
        png,
    )
        .into_response())
}

/// Lower-cased extension when it is one of the accepted image types
fn upload_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    UPLOAD_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// POST /api/upload
pub async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let ext = upload_extension(field.file_name().unwrap_or_default())
            .ok_or_else(|| ApiError::bad_request("Only jpg, png, gif, webp allowed"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid upload: {e}")))?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("No file uploaded"));
        }

        let file_name = format!("{}.{ext}", Uuid::new_v4().simple());
        let path = state.config.uploads_dir.join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to save file: {e}")))?;

        info!("📷 Stored upload {} ({} bytes)", file_name, bytes.len());
        return Ok(Json(json!({ "ok": true, "url": format!("/uploads/{file_name}") })));
    }

    Err(ApiError::bad_request("No file uploaded"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.JPG", Some("jpg"))]
    #[case("a.b.webp", Some("webp"))]
    #[case("shell.php", None)]
    #[case("noext", None)]
    fn accepts_image_extensions(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(upload_extension(name).as_deref(), expected);
    }
}
