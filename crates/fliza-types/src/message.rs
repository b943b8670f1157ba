//! Chat message types for Fliza.
//!
//! Messages are ordered ascending by `created_at` within a conversation,
//! ties broken by insertion order. A message starts life with a temporary
//! id (optimistic update) and is re-identified with a durable UUID v7 id
//! once the persistence layer confirms the write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::identity::UserId;

/// Prefix for optimistic user-message ids awaiting durable confirmation.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Prefix for assistant-reply ids delivered via the direct response path.
pub const AI_ID_PREFIX: &str = "ai-";

/// Prefix for locally generated fallback error message ids.
pub const ERR_ID_PREFIX: &str = "err-";

/// Role of a chat message author.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message within a conversation.
///
/// `id` is unique within a conversation. While pending it carries a
/// temporary prefix (`temp-`, `ai-`, `err-`); once durably stored it is a
/// UUID v7 string and `created_at` reflects the stored timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: UserId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Opaque key-value bag: remote session id, agent thought, action tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ChatMessage {
    /// Build an optimistic user message with a fresh temporary id.
    pub fn optimistic(user_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: format!("{TEMP_ID_PREFIX}{}", Uuid::now_v7().simple()),
            user_id,
            role: MessageRole::User,
            content: content.into(),
            created_at: Utc::now(),
            metadata: None,
        }
    }

    /// Build an assistant reply delivered via the direct response path,
    /// not yet reconciled with a durable row.
    pub fn assistant_reply(
        user_id: UserId,
        content: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: format!("{AI_ID_PREFIX}{}", Uuid::now_v7().simple()),
            user_id,
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
            metadata,
        }
    }

    /// Build a locally generated fallback error message shown in place of
    /// a real assistant reply.
    pub fn fallback(user_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: format!("{ERR_ID_PREFIX}{}", Uuid::now_v7().simple()),
            user_id,
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
            metadata: None,
        }
    }

    /// Whether this message still carries a temporary (pre-durable) id.
    pub fn is_pending(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
            || self.id.starts_with(AI_ID_PREFIX)
            || self.id.starts_with(ERR_ID_PREFIX)
    }
}
