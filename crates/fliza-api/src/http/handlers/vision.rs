//! Vision endpoint.
//!
//! POST /api/vision
//!
//! Analyzes a still camera frame and returns a short scene description
//! the client injects into the next chat send as vision context.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use fliza_core::media::VisionAnalyzer;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for the vision endpoint.
#[derive(Debug, Deserialize)]
pub struct VisionRequest {
    /// Base64-encoded camera frame, with or without a `data:` URL prefix.
    pub image: String,
}

/// POST /api/vision -- analyze a camera frame.
pub async fn analyze_frame(
    State(state): State<AppState>,
    Json(body): Json<VisionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let analysis = state.vision.analyze(&body.image).await?;

    Ok(Json(json!({
        "success": true,
        "analysis": analysis.analysis,
        "timestamp": analysis.timestamp,
    })))
}
