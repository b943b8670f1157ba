//! Remote agent session handle.
//!
//! The agent backend owns conversation sessions; Fliza only caches the
//! handle together with an expiry. One active session per user identifier
//! at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server-side conversation handle with its (locally adjusted) expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSession {
    /// Opaque session identifier issued by the agent backend.
    pub session_id: String,
    /// Moment after which this handle must no longer be used.
    pub expires_at: DateTime<Utc>,
}

impl AgentSession {
    pub fn new(session_id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            expires_at,
        }
    }

    /// Whether the handle is still usable at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
