//! AgentTransport trait definition.
//!
//! The two low-level remote calls against the agent backend. The HTTP
//! implementation lives in fliza-infra; tests use counting mocks.

use fliza_types::error::GatewayError;
use fliza_types::identity::UserId;
use fliza_types::session::AgentSession;

/// Low-level wire operations against the agent backend.
///
/// Implementations map transport failures onto the [`GatewayError`]
/// taxonomy: session creation failures to `SessionCreationFailed`, a gone
/// session (404 or a body mentioning "session") to `SessionExpired`, and
/// everything else to `SendFailed`.
pub trait AgentTransport: Send + Sync {
    /// Create a fresh conversation session for `user_id`.
    ///
    /// When the backend omits an expiry, implementations substitute the
    /// configured default (1 hour).
    fn create_session(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<AgentSession, GatewayError>> + Send;

    /// Deliver `content` to an existing session in synchronous mode and
    /// return the raw response envelope.
    ///
    /// The envelope shape drifts across backend versions; reply text is
    /// extracted separately by [`crate::agent::extract_reply`].
    fn send(
        &self,
        session_id: &str,
        content: &str,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, GatewayError>> + Send;
}
