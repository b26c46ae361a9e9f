//! Bulk import endpoints

use axum::Form;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::application::bulk_import::ImportStatus;
use crate::application::state::AppState;
use crate::infrastructure::marketplace::{MarketplaceProduct, normalize_store_url};
use crate::web::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct BulkImportForm {
    #[serde(default)]
    pub store_url: String,
}

/// POST /api/bulk-import
///
/// Starts a background import; the admin page polls the status endpoint.
pub async fn start_bulk_import(State(state): State<AppState>, Form(form): Form<BulkImportForm>) -> Json<Value> {
    let store_url = normalize_store_url(&form.store_url, &state.config.default_store_url);
    match state.importer.start(store_url).await {
        Ok(()) => Json(json!({ "ok": true, "message": "Import started" })),
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}

/// GET /api/bulk-import/status
pub async fn bulk_import_status(State(state): State<AppState>) -> Json<ImportStatus> {
    Json(state.importer.status().await)
}

/// POST /api/bulk-import/json
pub async fn import_json(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let products: Vec<MarketplaceProduct> =
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(format!("Invalid JSON: {e}")))?;

    let summary = state.importer.import_payload(products).await?;

    Ok(Json(json!({
        "ok": true,
        "imported": summary.imported,
        "skipped": summary.skipped,
        "total": summary.total,
    })))
}
