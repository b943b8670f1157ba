//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fliza_types::error::{ChatError, DesignError, GatewayError, RepositoryError, VisionError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat orchestration errors (single-flight rejection, gateway failures).
    Chat(ChatError),
    /// Vision analysis errors.
    Vision(VisionError),
    /// Design generation errors.
    Design(DesignError),
    /// Repository errors.
    Repository(RepositoryError),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<VisionError> for AppError {
    fn from(e: VisionError) -> Self {
        AppError::Vision(e)
    }
}

impl From<DesignError> for AppError {
    fn from(e: DesignError) -> Self {
        AppError::Design(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Chat(ChatError::SendInFlight) => (
                StatusCode::CONFLICT,
                "SEND_IN_FLIGHT",
                "A message is already being processed".to_string(),
            ),
            AppError::Chat(ChatError::Gateway(GatewayError::SessionCreationFailed {
                detail,
            })) => (
                StatusCode::BAD_GATEWAY,
                "SESSION_CREATION_FAILED",
                format!("failed to create agent session: {detail}"),
            ),
            // Display carries the "Eliza failed: {status}" shape the UI
            // keys on.
            AppError::Chat(ChatError::Gateway(e)) => {
                (StatusCode::BAD_GATEWAY, "AGENT_ERROR", e.to_string())
            }
            AppError::Vision(VisionError::NoImage) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "No image provided".to_string(),
            ),
            AppError::Vision(e) => (StatusCode::BAD_GATEWAY, "VISION_ERROR", e.to_string()),
            AppError::Design(DesignError::NoImage) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "No image provided".to_string(),
            ),
            AppError::Design(e) => (StatusCode::BAD_GATEWAY, "DESIGN_ERROR", e.to_string()),
            AppError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_in_flight_maps_to_conflict() {
        let response = AppError::Chat(ChatError::SendInFlight).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn gateway_failure_maps_to_bad_gateway() {
        let err = AppError::Chat(ChatError::Gateway(GatewayError::SessionExpired {
            status: 404,
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_image_maps_to_bad_request() {
        let response = AppError::Vision(VisionError::NoImage).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let response = AppError::Validation("Missing fields".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn repository_maps_to_internal_error() {
        let response = AppError::Repository(RepositoryError::Connection).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
