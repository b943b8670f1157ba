//! MessageRepository trait definition.
//!
//! Durable append-only store of messages per authenticated user. Guests
//! never reach this trait -- the orchestrator filters on the `guest-`
//! prefix before calling. Implementations live in fliza-infra (e.g.
//! `SqliteMessageRepository`).
//!
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use fliza_types::error::RepositoryError;
use fliza_types::identity::UserId;
use fliza_types::message::{ChatMessage, MessageRole};

/// Durable message store with ordered history reads.
///
/// Implementations publish an insert event on the message bus after each
/// successful `insert`, which is the realtime push source. Push delivery
/// is at-least-once and may race the direct response path.
pub trait MessageRepository: Send + Sync {
    /// Append a row and return it with its durable id and stored timestamp.
    fn insert(
        &self,
        user_id: &UserId,
        role: MessageRole,
        content: &str,
        metadata: Option<serde_json::Value>,
    ) -> impl std::future::Future<Output = Result<ChatMessage, RepositoryError>> + Send;

    /// All rows for `user_id`, ordered ascending by creation time.
    fn history(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;
}
