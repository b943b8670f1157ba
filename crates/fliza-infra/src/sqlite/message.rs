//! SQLite message repository implementation.
//!
//! Implements `MessageRepository` from `fliza-core` using sqlx with split
//! read/write pools. Every successful insert is published on the message
//! bus, which is the realtime push source for subscribers.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use fliza_core::event::MessageBus;
use fliza_core::repository::message::MessageRepository;
use fliza_types::error::RepositoryError;
use fliza_types::event::MessageEvent;
use fliza_types::identity::UserId;
use fliza_types::message::{ChatMessage, MessageRole};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageRepository`.
pub struct SqliteMessageRepository {
    pool: DatabasePool,
    bus: MessageBus,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool,
    /// publishing insert events on `bus`.
    pub fn new(pool: DatabasePool, bus: MessageBus) -> Self {
        Self { pool, bus }
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct MessageRow {
    id: String,
    user_id: String,
    role: String,
    content: String,
    metadata: Option<String>,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        let metadata = self
            .metadata
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid metadata JSON: {e}")))?;

        Ok(ChatMessage {
            id: self.id,
            user_id: UserId::new(self.user_id),
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            metadata,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// MessageRepository impl
// ---------------------------------------------------------------------------

impl MessageRepository for SqliteMessageRepository {
    async fn insert(
        &self,
        user_id: &UserId,
        role: MessageRole,
        content: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<ChatMessage, RepositoryError> {
        let message = ChatMessage {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.clone(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
            metadata,
        };

        let metadata_str = message
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("failed to serialize metadata: {e}")))?;

        sqlx::query(
            r#"INSERT INTO messages (id, user_id, role, content, metadata, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&message.id)
        .bind(message.user_id.as_str())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(&metadata_str)
        .bind(format_datetime(&message.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Realtime push: subscribers see the row the moment it is durable.
        self.bus.publish(MessageEvent::Inserted {
            message: message.clone(),
        });

        Ok(message)
    }

    async fn history(&self, user_id: &UserId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM messages WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }
}
