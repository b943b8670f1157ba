//! SessionStore trait definition.
//!
//! Maps a user identifier to a cached remote session handle. The store is
//! an explicit injected interface, never a module-level singleton: a
//! single-instance deployment uses [`super::InMemorySessionStore`], a
//! multi-instance deployment can plug in a shared key-value store behind
//! the same trait.
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use fliza_types::identity::UserId;
use fliza_types::session::AgentSession;

/// Lookup/store of the user -> session mapping.
///
/// Per-user entries are independent; implementations must be safe under
/// concurrent requests for different users, but no cross-user ordering is
/// required.
pub trait SessionStore: Send + Sync {
    /// Return the cached handle, only while it is still valid.
    ///
    /// An expired entry is treated as absent. Implementations need not
    /// evict eagerly, but must never return a handle past its expiry.
    fn get(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Option<AgentSession>> + Send;

    /// Cache a freshly created handle, replacing any previous entry.
    ///
    /// Implementations store the expiry reduced by a safety margin so the
    /// handle is never reused just as it expires server-side.
    fn put(
        &self,
        user_id: &UserId,
        session: AgentSession,
    ) -> impl std::future::Future<Output = ()> + Send;

    /// Remove the entry. Called when the backend rejects a send with an
    /// expiry/not-found signal.
    fn evict(&self, user_id: &UserId) -> impl std::future::Future<Output = ()> + Send;
}
