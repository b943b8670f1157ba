//! Chat endpoint.
//!
//! POST /api/chat
//!
//! Drives one user message through the orchestrator: optimistic append,
//! durable insert, design-intent short circuit or agent gateway delivery,
//! and dedup against the realtime push channel.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use fliza_core::chat::SendOutcome;
use fliza_types::identity::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The user message text.
    pub message: String,
    /// Stable user id; `guest-` prefixed ids skip persistence.
    pub user_id: String,
    /// Latest camera scene description, injected into the outbound text.
    pub vision_context: Option<String>,
    /// Base64 camera frame for the design workflow.
    pub attached_image: Option<String>,
}

/// POST /api/chat -- submit a user message, get the assistant reply or a
/// design trigger.
pub async fn send_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.message.trim().is_empty() || body.user_id.trim().is_empty() {
        return Err(AppError::Validation(
            "message and userId are required".to_string(),
        ));
    }

    let user_id = UserId::new(body.user_id);
    let orchestrator = state.orchestrator(&user_id).await;

    let outcome = orchestrator
        .send_message(
            &body.message,
            body.vision_context.as_deref(),
            body.attached_image.as_deref(),
        )
        .await?;

    let response = match outcome {
        SendOutcome::Reply(reply) => json!({
            "success": true,
            "response": reply.content,
            "messageId": reply.id,
        }),
        SendOutcome::DesignTriggered {
            prompt,
            acknowledgment,
            artifact,
        } => {
            let mut response = json!({
                "success": true,
                "action": "TRIGGER_DESIGN",
                "designPrompt": prompt,
                "response": acknowledgment.content,
            });
            if let Some(artifact) = artifact {
                response["design"] = json!({
                    "image": artifact.image,
                    "text": artifact.text,
                });
            }
            response
        }
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_parses_camel_case() {
        let body: ChatRequest = serde_json::from_value(json!({
            "message": "hello",
            "userId": "guest-1",
            "visionContext": "a desk with a laptop",
            "attachedImage": "data:image/jpeg;base64,AAAA",
        }))
        .unwrap();

        assert_eq!(body.message, "hello");
        assert_eq!(body.user_id, "guest-1");
        assert_eq!(body.vision_context.as_deref(), Some("a desk with a laptop"));
        assert!(body.attached_image.is_some());
    }

    #[test]
    fn chat_request_optional_fields_default_to_none() {
        let body: ChatRequest = serde_json::from_value(json!({
            "message": "hello",
            "userId": "user-1",
        }))
        .unwrap();

        assert!(body.vision_context.is_none());
        assert!(body.attached_image.is_none());
    }
}
