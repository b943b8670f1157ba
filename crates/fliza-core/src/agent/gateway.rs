//! Agent gateway orchestrating session resolution and message delivery.
//!
//! The gateway performs the two-step protocol against the agent backend:
//! resolve a session (cache hit, or create and cache), then send the
//! message in synchronous mode. A send rejected with an expiry signal
//! evicts the cached entry but is not retried within the same call; the
//! caller re-invokes and gets a fresh session. Generic over
//! [`AgentTransport`] and [`SessionStore`] so fliza-core never depends on
//! fliza-infra.

use tracing::{debug, info, warn};

use fliza_types::agent::AgentReply;
use fliza_types::error::GatewayError;
use fliza_types::identity::UserId;

use crate::agent::reply::extract_reply;
use crate::agent::transport::AgentTransport;
use crate::session::store::SessionStore;

/// A successfully delivered reply, tagged with the session that carried it.
///
/// Every assistant message surfaced to the UI is attributable to exactly
/// one session that was valid when the originating request was sent.
#[derive(Debug, Clone)]
pub struct SentReply {
    pub session_id: String,
    pub reply: AgentReply,
}

/// Delivers user messages to the remote agent, transparently creating
/// sessions as needed.
pub struct AgentGateway<T: AgentTransport, S: SessionStore> {
    transport: T,
    sessions: S,
}

impl<T: AgentTransport, S: SessionStore> AgentGateway<T, S> {
    pub fn new(transport: T, sessions: S) -> Self {
        Self {
            transport,
            sessions,
        }
    }

    /// Access the session store.
    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver a message and return the agent's reply.
    ///
    /// `vision_context`, when present, is prefixed to the outbound text as
    /// a bracketed annotation block so the agent sees what the camera saw.
    ///
    /// On [`GatewayError::SessionExpired`] the cached entry is evicted and
    /// the error propagated; the next call creates a fresh session. There
    /// is deliberately no automatic in-call retry.
    pub async fn send_message(
        &self,
        user_id: &UserId,
        message: &str,
        vision_context: Option<&str>,
    ) -> Result<SentReply, GatewayError> {
        let session = self.resolve_session(user_id).await?;

        let outbound = compose_outbound(message, vision_context);

        let envelope = match self.transport.send(&session.session_id, &outbound).await {
            Ok(envelope) => envelope,
            Err(err @ GatewayError::SessionExpired { .. }) => {
                warn!(
                    user_id = %user_id,
                    session_id = %session.session_id,
                    "agent session gone, evicting cache entry"
                );
                self.sessions.evict(user_id).await;
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let reply = extract_reply(&envelope).ok_or(GatewayError::EmptyReply)?;
        debug!(
            user_id = %user_id,
            session_id = %session.session_id,
            "agent reply received"
        );

        Ok(SentReply {
            session_id: session.session_id,
            reply,
        })
    }

    /// Return the cached session for `user_id`, creating one on miss.
    async fn resolve_session(
        &self,
        user_id: &UserId,
    ) -> Result<fliza_types::session::AgentSession, GatewayError> {
        if let Some(session) = self.sessions.get(user_id).await {
            return Ok(session);
        }

        let session = self.transport.create_session(user_id).await?;
        info!(
            user_id = %user_id,
            session_id = %session.session_id,
            "created agent session"
        );
        self.sessions.put(user_id, session.clone()).await;
        Ok(session)
    }
}

/// Compose the outbound text, prefixing the vision-context annotation
/// block when a scene description is available.
fn compose_outbound(message: &str, vision_context: Option<&str>) -> String {
    match vision_context {
        Some(ctx) => format!("[VISION_CONTEXT: {ctx}]\n\nUser: {message}"),
        None => message.to_string(),
    }
}
