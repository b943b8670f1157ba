//! History endpoint.
//!
//! GET /api/history/{user_id}
//!
//! Returns the durable message history in ascending creation order.
//! Guests have no durable history and always get an empty list, without
//! touching the repository.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use fliza_core::repository::MessageRepository;
use fliza_types::identity::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /api/history/{user_id} -- durable history, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user_id = UserId::new(user_id);

    if user_id.is_guest() {
        return Ok(Json(json!({ "success": true, "messages": [] })));
    }

    let messages = state.repository.history(&user_id).await?;

    Ok(Json(json!({ "success": true, "messages": messages })))
}
