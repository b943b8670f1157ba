use thiserror::Error;

/// Maximum length of remote error detail carried in an error variant.
///
/// Remote bodies can be arbitrarily large; only a bounded prefix is kept.
pub const ERROR_DETAIL_MAX_LEN: usize = 200;

/// Truncate remote error detail to [`ERROR_DETAIL_MAX_LEN`] bytes on a
/// char boundary.
pub fn truncate_detail(detail: &str) -> String {
    if detail.len() <= ERROR_DETAIL_MAX_LEN {
        return detail.to_string();
    }
    let mut end = ERROR_DETAIL_MAX_LEN;
    while !detail.is_char_boundary(end) {
        end -= 1;
    }
    detail[..end].to_string()
}

/// Errors from the agent gateway (session creation and message delivery).
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The session-creation endpoint was unreachable or returned non-2xx.
    /// Surfaced as a top-level operation failure, no retry.
    #[error("failed to create agent session: {detail}")]
    SessionCreationFailed { detail: String },

    /// The backend reported the session gone: 404 status, or an error body
    /// mentioning "session". Triggers cache eviction only; the caller must
    /// re-invoke to get a fresh session.
    #[error("Eliza failed: {status}: session expired")]
    SessionExpired { status: u16 },

    /// Any other non-2xx from the message endpoint. `detail` is truncated
    /// to [`ERROR_DETAIL_MAX_LEN`] bytes.
    #[error("Eliza failed: {status}: {detail}")]
    SendFailed { status: u16, detail: String },

    /// The response envelope carried no reply text at any known field path.
    #[error("agent returned no reply text")]
    EmptyReply,

    /// Connection-level failure before an HTTP status was available.
    #[error("agent request failed: {detail}")]
    Transport { detail: String },
}

/// Errors from repository operations (trait definitions live in fliza-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors surfaced by the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A second send was attempted while one is outstanding for this user.
    #[error("a send is already in flight for this user")]
    SendInFlight,

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors from camera-frame vision analysis.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("no image provided")]
    NoImage,

    #[error("vision analysis failed: {0}")]
    AnalysisFailed(String),
}

/// Errors from design-image generation.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("no image provided")]
    NoImage,

    /// The model responded without an inline image part.
    #[error("no image generated")]
    NoImageGenerated,

    #[error("design generation failed: {0}")]
    GenerationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_failed_display() {
        let err = GatewayError::SendFailed {
            status: 500,
            detail: "internal".to_string(),
        };
        assert!(err.to_string().contains("Eliza failed: 500"));
    }

    #[test]
    fn test_session_expired_display() {
        let err = GatewayError::SessionExpired { status: 404 };
        assert!(err.to_string().contains("Eliza failed: 404"));
    }

    #[test]
    fn test_truncate_detail_bounds_length() {
        let long = "x".repeat(1000);
        let truncated = truncate_detail(&long);
        assert_eq!(truncated.len(), ERROR_DETAIL_MAX_LEN);
    }

    #[test]
    fn test_truncate_detail_respects_char_boundary() {
        // Multi-byte char straddling the cut point must not split.
        let mut s = "a".repeat(ERROR_DETAIL_MAX_LEN - 1);
        s.push('é');
        s.push_str("tail");
        let truncated = truncate_detail(&s);
        assert!(truncated.len() <= ERROR_DETAIL_MAX_LEN);
        assert!(truncated.is_char_boundary(truncated.len()));
    }

    #[test]
    fn test_truncate_detail_short_passthrough() {
        assert_eq!(truncate_detail("short"), "short");
    }

    #[test]
    fn test_chat_error_from_gateway() {
        let err: ChatError = GatewayError::EmptyReply.into();
        assert!(matches!(err, ChatError::Gateway(GatewayError::EmptyReply)));
    }
}
