//! Request handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ApiError;
use super::pages;
use super::AppState;
use crate::qr::{self, QrOptions};
use crate::stats::{StatsSnapshot, StorageType};

/// GET /
/// Counts the view, then serves the configured page.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    state.store.record_event().await;

    (
        [(header::CACHE_CONTROL, "no-cache")],
        Html(pages::render(state.page, Utc::now())),
    )
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    let counts = state.store.get_counts().await;
    debug!(
        last_hour = counts.last_hour,
        storage = %counts.storage_type,
        "Serving page view stats"
    );
    Json(counts)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage_type: StorageType,
    pub version: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        storage_type: state.store.storage_type().await,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QrRequest {
    pub url: String,
    #[serde(flatten)]
    pub options: QrOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QrResponse {
    /// Canonical destination encoded in the image
    pub target: String,
    pub image_url: String,
}

/// POST /api/qr
/// Builds the QR image link for a destination URL.
pub async fn generate_qr(
    payload: Result<Json<QrRequest>, JsonRejection>,
) -> Result<Json<QrResponse>, ApiError> {
    let Json(request) = payload?;

    let target = qr::canonicalize(&request.url)?;
    let image_url = qr::build_image_url(&target, &request.options)?;

    debug!(target = %target, size = request.options.size, "Built QR image link");

    Ok(Json(QrResponse {
        target,
        image_url: image_url.into(),
    }))
}
