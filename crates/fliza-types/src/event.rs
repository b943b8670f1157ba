//! Realtime events pushed when the message store changes.
//!
//! Delivered over the message bus independently of the direct HTTP
//! response path; consumers must tolerate at-least-once delivery and the
//! race between the two paths.

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// A change notification from the persisted message store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageEvent {
    /// A new row was durably inserted.
    Inserted { message: ChatMessage },
}

impl MessageEvent {
    /// The user the event belongs to, for per-user filtering.
    pub fn user_id(&self) -> &crate::identity::UserId {
        match self {
            MessageEvent::Inserted { message } => &message.user_id,
        }
    }
}
