//! Design endpoint.
//!
//! POST /api/design
//!
//! Generates a stylized design image from a source camera frame and an
//! optional prompt. Invoked by the client after a chat send returns
//! `TRIGGER_DESIGN` without an attached frame.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use fliza_core::media::DesignGenerator;
use fliza_types::error::DesignError;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for the design endpoint.
#[derive(Debug, Deserialize)]
pub struct DesignRequest {
    /// Base64-encoded source frame.
    pub image: String,
    /// Design instruction; the generator substitutes a default when empty.
    #[serde(default)]
    pub prompt: String,
}

/// POST /api/design -- generate a design image from a frame.
pub async fn generate_design(
    State(state): State<AppState>,
    Json(body): Json<DesignRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.image.is_empty() {
        return Err(AppError::Design(DesignError::NoImage));
    }

    let artifact = state.design.generate(&body.prompt, &body.image).await?;

    Ok(Json(json!({
        "success": true,
        "image": artifact.image,
        "text": artifact.text,
    })))
}
