//! In-memory session store for single-instance deployments.
//!
//! Process-local, rebuilt from scratch on restart -- sessions are cheap to
//! recreate. Backed by `DashMap` so lookups and writes for different users
//! never contend on a global lock.

use chrono::{Duration, Utc};
use dashmap::DashMap;

use fliza_types::identity::UserId;
use fliza_types::session::AgentSession;

use super::store::SessionStore;

/// Default safety margin subtracted from the server expiry on `put`.
const DEFAULT_SAFETY_MARGIN_SECS: i64 = 300;

/// DashMap-backed implementation of [`SessionStore`].
pub struct InMemorySessionStore {
    entries: DashMap<UserId, AgentSession>,
    safety_margin: Duration,
}

impl InMemorySessionStore {
    /// Create a store with the default 5-minute safety margin.
    pub fn new() -> Self {
        Self::with_safety_margin(Duration::seconds(DEFAULT_SAFETY_MARGIN_SECS))
    }

    /// Create a store with an explicit safety margin.
    pub fn with_safety_margin(safety_margin: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            safety_margin,
        }
    }

    /// Number of cached entries, expired ones included (no eager eviction).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &UserId) -> Option<AgentSession> {
        let entry = self.entries.get(user_id)?;
        if entry.is_valid_at(Utc::now()) {
            Some(entry.clone())
        } else {
            // Expired entries are simply not returned; the next put
            // overwrites them.
            None
        }
    }

    async fn put(&self, user_id: &UserId, mut session: AgentSession) {
        session.expires_at -= self.safety_margin;
        tracing::debug!(
            user_id = %user_id,
            session_id = %session.session_id,
            expires_at = %session.expires_at,
            "caching agent session"
        );
        self.entries.insert(user_id.clone(), session);
    }

    async fn evict(&self, user_id: &UserId) {
        if self.entries.remove(user_id).is_some() {
            tracing::debug!(user_id = %user_id, "evicted agent session");
        }
    }
}
