use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, Uri},
    routing::post,
    Json, Router,
};
use chrono::Local;
use dsp_core::Order;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratePdfResponse {
    pub tracking_code: String,
    pub pdf_url: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/generate-pdf", post(generate_pdf))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /generate-pdf
/// Render a delivery receipt for the posted order
pub async fn generate_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GeneratePdfResponse>, AppError> {
    // 1. Parse the order; nothing touches the disk before this succeeds
    let Json(body) = payload.map_err(AppError::InvalidPayload)?;
    let order = Order::from_value(body).map_err(|e| AppError::ValidationError(e.to_string()))?;

    // 2. Tracking code and destination
    let tracking_code = state.codes.next_code();
    let generated_at = Local::now().naive_local();
    let slot = state.store.allocate(&tracking_code, generated_at)?;

    // 3. Layout and file write are blocking
    let renderer = state.renderer.clone();
    let code = tracking_code.clone();
    let path = slot.path.clone();
    let delivery_type = order.delivery_type();
    tokio::task::spawn_blocking(move || renderer.render_at(&order, &code, generated_at, &path)).await??;

    info!(
        "Generated receipt {} for {} delivery ({})",
        slot.file_name, delivery_type, tracking_code
    );

    // 4. Absolute URL of the served file
    let root = match &state.public_base_url {
        Some(base) => with_trailing_slash(base),
        None => host_root(&headers, &uri),
    };

    Ok(Json(GeneratePdfResponse {
        tracking_code: tracking_code.to_string(),
        pdf_url: format!("{}{}", root, slot.public_path),
    }))
}

/// `<scheme>://<host>/` of the inbound request.
fn host_root(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string());

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    format!("{}://{}/", scheme, host)
}

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}
