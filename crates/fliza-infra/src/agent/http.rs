//! HttpAgentTransport -- concrete [`AgentTransport`] over the agent
//! backend's messaging API.
//!
//! Two endpoints: `POST /api/messaging/sessions` to create a conversation
//! session for `(agentId, userId)`, and
//! `POST /api/messaging/sessions/{id}/messages` to deliver a message in
//! synchronous mode. Both calls carry a bounded timeout so a hung backend
//! never leaves the UI composing forever.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fliza_core::agent::transport::AgentTransport;
use fliza_types::config::AgentConfig;
use fliza_types::error::{truncate_detail, GatewayError};
use fliza_types::identity::UserId;
use fliza_types::session::AgentSession;

/// HTTP implementation of [`AgentTransport`].
pub struct HttpAgentTransport {
    client: reqwest::Client,
    base_url: String,
    agent_id: String,
    default_session_ttl: chrono::Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest<'a> {
    agent_id: &'a str,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    session_id: String,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    content: &'a str,
    mode: &'static str,
}

impl HttpAgentTransport {
    pub fn new(config: &AgentConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.clone(),
            agent_id: config.agent_id.clone(),
            default_session_ttl: chrono::Duration::seconds(
                config.default_session_ttl_secs as i64,
            ),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Build an [`AgentSession`] from the create response, substituting the
/// default TTL when the backend omits an expiry.
fn session_from_response(
    response: CreateSessionResponse,
    default_ttl: chrono::Duration,
) -> AgentSession {
    let expires_at = response
        .expires_at
        .unwrap_or_else(|| Utc::now() + default_ttl);
    AgentSession::new(response.session_id, expires_at)
}

/// Map a non-2xx send response onto the gateway error taxonomy.
///
/// 404, or any error body mentioning "session", signals the session is
/// gone; everything else is a plain send failure with bounded detail.
fn classify_send_failure(status: u16, body: &str) -> GatewayError {
    if status == 404 || body.to_lowercase().contains("session") {
        GatewayError::SessionExpired { status }
    } else {
        GatewayError::SendFailed {
            status,
            detail: truncate_detail(body),
        }
    }
}

impl AgentTransport for HttpAgentTransport {
    async fn create_session(&self, user_id: &UserId) -> Result<AgentSession, GatewayError> {
        let body = CreateSessionRequest {
            agent_id: &self.agent_id,
            user_id: user_id.as_str(),
        };

        let response = self
            .client
            .post(self.url("/api/messaging/sessions"))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::SessionCreationFailed {
                detail: truncate_detail(&e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::SessionCreationFailed {
                detail: truncate_detail(&format!("HTTP {status}: {error_body}")),
            });
        }

        let parsed: CreateSessionResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::SessionCreationFailed {
                    detail: truncate_detail(&format!("invalid response: {e}")),
                })?;

        Ok(session_from_response(parsed, self.default_session_ttl))
    }

    async fn send(
        &self,
        session_id: &str,
        content: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        let body = SendMessageRequest {
            content,
            mode: "sync",
        };

        let response = self
            .client
            .post(self.url(&format!("/api/messaging/sessions/{session_id}/messages")))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport {
                detail: truncate_detail(&e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %truncate_detail(&error_body),
                "agent send failed"
            );
            return Err(classify_send_failure(status.as_u16(), &error_body));
        }

        response.json().await.map_err(|e| GatewayError::Transport {
            detail: truncate_detail(&format!("invalid response body: {e}")),
        })
    }
}
