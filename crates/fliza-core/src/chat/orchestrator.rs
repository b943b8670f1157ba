//! Per-conversation chat orchestrator.
//!
//! Owns the in-memory message list for one user, issues optimistic local
//! updates, coordinates persistence, and reconciles duplicate deliveries
//! between the direct response path and the realtime push channel.
//!
//! State machine per send: Idle -> Sending (optimistic append, composing
//! true) -> Reconciling (durable insert replaces the temporary id, gateway
//! invoked) -> Idle (reply appended after dedup, or the fixed fallback
//! message on failure). The composing flag is cleared on every exit path.
//!
//! Single-flight is explicit: a second send while one is outstanding is
//! rejected with [`ChatError::SendInFlight`] rather than relying on UI
//! input disablement.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Duration;
use serde_json::json;
use tracing::{error, warn};

use fliza_types::agent::DesignArtifact;
use fliza_types::error::{ChatError, RepositoryError};
use fliza_types::event::MessageEvent;
use fliza_types::identity::UserId;
use fliza_types::message::{ChatMessage, MessageRole};

use crate::agent::gateway::{AgentGateway, SentReply};
use crate::agent::intent::detect_design_intent;
use crate::agent::transport::AgentTransport;
use crate::media::DesignGenerator;
use crate::repository::message::MessageRepository;
use crate::session::store::SessionStore;

/// Fixed user-visible reply shown when the agent is unreachable.
pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting to the network (Demo Mode).";

/// Fixed acknowledgment shown when a message is routed to the design
/// workflow.
pub const DESIGN_ACK: &str =
    "I'll create a design based on what I see. Give me a moment... \u{1F3A8}";

/// Fixed user-visible reply substituting for a failed design artifact.
pub const DESIGN_FAILED_REPLY: &str =
    "My art supplies glitched mid-sketch... let's try that design again. \u{1F3A8}";

/// Window inside which identical assistant content is considered the same
/// delivery, for the brief interval before the durable id is known.
const DEDUP_WINDOW_SECS: i64 = 30;

/// Upper bound on the in-memory message list. Older entries are dropped
/// once the list exceeds this; the durable store keeps the full history.
const LOCAL_HISTORY_LIMIT: usize = 256;

/// Outcome of a successful send.
#[derive(Debug)]
pub enum SendOutcome {
    /// The assistant reply that was appended (post-dedup).
    Reply(ChatMessage),
    /// The message was short-circuited into the design workflow; the agent
    /// gateway was never invoked.
    DesignTriggered {
        prompt: String,
        acknowledgment: ChatMessage,
        /// Present when a camera frame was attached and generation
        /// succeeded. Absent frames leave generation to a follow-up call.
        artifact: Option<DesignArtifact>,
    },
}

/// Orchestrates one user's conversation.
///
/// Generic over transport, session store, repository, and design generator
/// so fliza-core never depends on fliza-infra.
pub struct ChatOrchestrator<T, S, R, D>
where
    T: AgentTransport,
    S: SessionStore,
    R: MessageRepository,
    D: DesignGenerator,
{
    user_id: UserId,
    gateway: Arc<AgentGateway<T, S>>,
    repository: Arc<R>,
    design: Arc<D>,
    messages: Mutex<Vec<ChatMessage>>,
    composing: AtomicBool,
    started_at: chrono::DateTime<chrono::Utc>,
}

/// Clears the composing flag when a send exits, on every path.
struct ComposingGuard<'a>(&'a AtomicBool);

impl Drop for ComposingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<T, S, R, D> ChatOrchestrator<T, S, R, D>
where
    T: AgentTransport,
    S: SessionStore,
    R: MessageRepository,
    D: DesignGenerator,
{
    pub fn new(
        user_id: UserId,
        gateway: Arc<AgentGateway<T, S>>,
        repository: Arc<R>,
        design: Arc<D>,
    ) -> Self {
        Self {
            user_id,
            gateway,
            repository,
            design,
            messages: Mutex::new(Vec::new()),
            composing: AtomicBool::new(false),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Whether the assistant is composing (a send is in flight).
    pub fn is_composing(&self) -> bool {
        self.composing.load(Ordering::SeqCst)
    }

    /// Snapshot of the current message list, ascending by creation time
    /// (ties keep insertion order).
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Timestamp of the newest local message, or of creation while the
    /// list is empty. Used by the registry to find idle conversations.
    pub fn last_activity(&self) -> chrono::DateTime<chrono::Utc> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.created_at)
            .max()
            .unwrap_or(self.started_at)
    }

    /// Replace local state with the durable history.
    ///
    /// Guests have no durable history; their state stays in memory only.
    pub async fn load_history(&self) -> Result<(), RepositoryError> {
        if self.user_id.is_guest() {
            return Ok(());
        }
        let mut rows = self.repository.history(&self.user_id).await?;
        trim_overflow(&mut rows);
        *self.messages.lock().unwrap() = rows;
        Ok(())
    }

    /// Submit a user message and drive it to completion.
    ///
    /// `vision_context` is the latest camera scene description, injected
    /// into the outbound text. `attached_image` is a base64 camera frame
    /// used when the message routes to the design workflow.
    pub async fn send_message(
        &self,
        content: &str,
        vision_context: Option<&str>,
        attached_image: Option<&str>,
    ) -> Result<SendOutcome, ChatError> {
        if self
            .composing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ChatError::SendInFlight);
        }
        let _composing = ComposingGuard(&self.composing);

        // Optimistic append: the user sees their message immediately.
        let optimistic = ChatMessage::optimistic(self.user_id.clone(), content);
        let temp_id = optimistic.id.clone();
        self.push_bounded(optimistic);

        self.persist_and_reconcile(&temp_id, MessageRole::User, content, None)
            .await;

        // Design-intent short circuit: the agent gateway is never invoked.
        if let Some(prompt) = detect_design_intent(content) {
            return Ok(self.run_design_workflow(prompt, attached_image).await);
        }

        match self
            .gateway
            .send_message(&self.user_id, content, vision_context)
            .await
        {
            Ok(sent) => {
                let metadata = reply_metadata(&sent);
                let reply = ChatMessage::assistant_reply(
                    self.user_id.clone(),
                    sent.reply.text.clone(),
                    Some(metadata.clone()),
                );
                let appended = self.append_deduped(reply);

                self.persist_and_reconcile(
                    &appended.id,
                    MessageRole::Assistant,
                    &sent.reply.text,
                    Some(metadata),
                )
                .await;

                Ok(SendOutcome::Reply(appended))
            }
            Err(err) => {
                warn!(user_id = %self.user_id, error = %err, "gateway send failed");
                self.push_bounded(ChatMessage::fallback(self.user_id.clone(), FALLBACK_REPLY));
                Err(ChatError::Gateway(err))
            }
        }
    }

    /// Ingest a realtime push event, deduplicating against anything the
    /// direct response path already delivered.
    pub fn apply_event(&self, event: &MessageEvent) {
        let MessageEvent::Inserted { message } = event;
        if message.user_id != self.user_id {
            return;
        }

        let mut messages = self.messages.lock().unwrap();

        // Durable id match: already delivered (at-least-once push).
        if messages.iter().any(|m| m.id == message.id) {
            return;
        }

        // Pending match: same role and content inside the dedup window is
        // the other delivery path for the same message. Adopt the durable
        // row in place.
        if let Some(pending) = messages.iter_mut().find(|m| {
            m.is_pending()
                && m.role == message.role
                && m.content == message.content
                && within_dedup_window(m, message)
        }) {
            *pending = message.clone();
            return;
        }

        messages.push(message.clone());
        trim_overflow(&mut messages);
    }

    /// Persist a row for authenticated users, swapping the local pending
    /// entry for the durable one. Guests skip the whole step. Failures are
    /// logged and swallowed -- a failed durable write never blocks the
    /// reply path.
    async fn persist_and_reconcile(
        &self,
        local_id: &str,
        role: MessageRole,
        content: &str,
        metadata: Option<serde_json::Value>,
    ) {
        if self.user_id.is_guest() {
            return;
        }
        match self
            .repository
            .insert(&self.user_id, role, content, metadata)
            .await
        {
            Ok(saved) => {
                let mut messages = self.messages.lock().unwrap();
                if let Some(local) = messages.iter_mut().find(|m| m.id == local_id) {
                    *local = saved;
                } else if !messages.iter().any(|m| m.id == saved.id) {
                    // The push channel raced us and already reconciled the
                    // pending entry under a different match; keep exactly
                    // one copy.
                    messages.push(saved);
                    trim_overflow(&mut messages);
                }
            }
            Err(err) => {
                error!(user_id = %self.user_id, error = %err, "failed to persist message");
            }
        }
    }

    /// Append an assistant reply unless an equal delivery already arrived
    /// via the push channel. Returns the surviving message.
    fn append_deduped(&self, reply: ChatMessage) -> ChatMessage {
        let mut messages = self.messages.lock().unwrap();
        if let Some(existing) = messages.iter().find(|m| {
            m.role == MessageRole::Assistant
                && m.content == reply.content
                && (m.id == reply.id || within_dedup_window(m, &reply))
        }) {
            return existing.clone();
        }
        messages.push(reply.clone());
        trim_overflow(&mut messages);
        reply
    }

    /// Append a message, dropping the oldest entries past the local cap.
    fn push_bounded(&self, message: ChatMessage) {
        let mut messages = self.messages.lock().unwrap();
        messages.push(message);
        trim_overflow(&mut messages);
    }

    async fn run_design_workflow(
        &self,
        prompt: String,
        attached_image: Option<&str>,
    ) -> SendOutcome {
        let acknowledgment = ChatMessage::assistant_reply(
            self.user_id.clone(),
            DESIGN_ACK,
            Some(json!({ "action": "TRIGGER_DESIGN" })),
        );
        self.push_bounded(acknowledgment.clone());

        let artifact = match attached_image {
            Some(image) => match self.design.generate(&prompt, image).await {
                Ok(artifact) => Some(artifact),
                Err(err) => {
                    warn!(user_id = %self.user_id, error = %err, "design generation failed");
                    self.push_bounded(ChatMessage::fallback(
                        self.user_id.clone(),
                        DESIGN_FAILED_REPLY,
                    ));
                    None
                }
            },
            None => None,
        };

        SendOutcome::DesignTriggered {
            prompt,
            acknowledgment,
            artifact,
        }
    }
}

fn within_dedup_window(a: &ChatMessage, b: &ChatMessage) -> bool {
    (a.created_at - b.created_at).abs() <= Duration::seconds(DEDUP_WINDOW_SECS)
}

/// Drop the oldest entries once the list exceeds the local cap.
fn trim_overflow(messages: &mut Vec<ChatMessage>) {
    if messages.len() > LOCAL_HISTORY_LIMIT {
        let excess = messages.len() - LOCAL_HISTORY_LIMIT;
        messages.drain(..excess);
    }
}

fn reply_metadata(sent: &SentReply) -> serde_json::Value {
    let mut metadata = json!({ "sessionId": sent.session_id });
    if let Some(thought) = &sent.reply.thought {
        metadata["thought"] = json!(thought);
    }
    if !sent.reply.actions.is_empty() {
        metadata["actions"] = json!(sent.reply.actions);
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use crate::session::InMemorySessionStore;
    use fliza_types::error::{DesignError, GatewayError};
    use fliza_types::session::AgentSession;

    struct StubTransport {
        send_calls: AtomicUsize,
        result: Result<Value, GatewayError>,
        gate: Option<Arc<Notify>>,
    }

    impl StubTransport {
        fn replying(envelope: Value) -> Self {
            Self {
                send_calls: AtomicUsize::new(0),
                result: Ok(envelope),
                gate: None,
            }
        }

        fn failing(err: GatewayError) -> Self {
            Self {
                send_calls: AtomicUsize::new(0),
                result: Err(err),
                gate: None,
            }
        }

        fn gated(envelope: Value, gate: Arc<Notify>) -> Self {
            Self {
                send_calls: AtomicUsize::new(0),
                result: Ok(envelope),
                gate: Some(gate),
            }
        }
    }

    impl AgentTransport for StubTransport {
        async fn create_session(&self, _user_id: &UserId) -> Result<AgentSession, GatewayError> {
            Ok(AgentSession::new(
                "sess-1",
                Utc::now() + Duration::hours(1),
            ))
        }

        async fn send(&self, _session_id: &str, _content: &str) -> Result<Value, GatewayError> {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.result.clone()
        }
    }

    struct StubRepository {
        insert_calls: AtomicUsize,
        fail_inserts: bool,
        rows: Mutex<Vec<ChatMessage>>,
    }

    impl StubRepository {
        fn new() -> Self {
            Self {
                insert_calls: AtomicUsize::new(0),
                fail_inserts: false,
                rows: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail_inserts: true,
                ..Self::new()
            }
        }
    }

    impl MessageRepository for StubRepository {
        async fn insert(
            &self,
            user_id: &UserId,
            role: MessageRole,
            content: &str,
            metadata: Option<Value>,
        ) -> Result<ChatMessage, RepositoryError> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_inserts {
                return Err(RepositoryError::Connection);
            }
            let row = ChatMessage {
                id: Uuid::now_v7().to_string(),
                user_id: user_id.clone(),
                role,
                content: content.to_string(),
                created_at: Utc::now(),
                metadata,
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn history(&self, user_id: &UserId) -> Result<Vec<ChatMessage>, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| &m.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    struct StubDesign {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubDesign {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    impl DesignGenerator for StubDesign {
        async fn generate(&self, _prompt: &str, _image: &str) -> Result<DesignArtifact, DesignError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DesignError::NoImageGenerated);
            }
            Ok(DesignArtifact {
                image: "data:image/png;base64,AAAA".to_string(),
                text: Some("here is your poster".to_string()),
            })
        }
    }

    type TestOrchestrator =
        ChatOrchestrator<StubTransport, InMemorySessionStore, StubRepository, StubDesign>;

    fn orchestrator(
        user: &str,
        transport: StubTransport,
        repository: StubRepository,
        design: StubDesign,
    ) -> TestOrchestrator {
        let gateway = Arc::new(AgentGateway::new(
            transport,
            InMemorySessionStore::with_safety_margin(Duration::zero()),
        ));
        ChatOrchestrator::new(
            UserId::new(user),
            gateway,
            Arc::new(repository),
            Arc::new(design),
        )
    }

    #[tokio::test]
    async fn hello_scenario_appends_user_then_assistant() {
        let orch = orchestrator(
            "guest-1",
            StubTransport::replying(json!({"agentResponse": {"text": "hi there"}})),
            StubRepository::new(),
            StubDesign::new(),
        );

        let outcome = orch.send_message("hello", None, None).await.unwrap();
        assert!(matches!(outcome, SendOutcome::Reply(_)));

        let messages = orch.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "hi there");
        assert!(!orch.is_composing());
    }

    #[tokio::test]
    async fn guests_never_touch_the_repository() {
        let orch = orchestrator(
            "guest-abc",
            StubTransport::replying(json!({"text": "hi"})),
            StubRepository::new(),
            StubDesign::new(),
        );

        orch.send_message("hello", None, None).await.unwrap();
        assert_eq!(orch.repository.insert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn authenticated_messages_get_durable_ids() {
        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "hi"})),
            StubRepository::new(),
            StubDesign::new(),
        );

        orch.send_message("hello", None, None).await.unwrap();

        // One insert for the user message, one for the assistant reply.
        assert_eq!(orch.repository.insert_calls.load(Ordering::SeqCst), 2);
        let messages = orch.messages();
        assert!(messages.iter().all(|m| !m.is_pending()));
    }

    #[tokio::test]
    async fn design_intent_short_circuits_the_gateway() {
        let orch = orchestrator(
            "guest-1",
            StubTransport::replying(json!({"text": "should not be reached"})),
            StubRepository::new(),
            StubDesign::new(),
        );

        let outcome = orch
            .send_message("can you design a poster of this", None, Some("base64frame"))
            .await
            .unwrap();

        let SendOutcome::DesignTriggered {
            prompt, artifact, ..
        } = outcome
        else {
            panic!("expected design outcome");
        };
        assert_eq!(prompt, "can you design a poster of this");
        assert!(artifact.is_some());
        assert_eq!(orch.gateway.sessions().get(orch.user_id()).await, None);

        // Gateway transport was never invoked.
        let messages = orch.messages();
        assert_eq!(messages[1].content, DESIGN_ACK);
        assert_eq!(orch.design.calls.load(Ordering::SeqCst), 1);
        assert!(!orch.is_composing());
    }

    #[tokio::test]
    async fn design_without_frame_skips_generation() {
        let orch = orchestrator(
            "guest-1",
            StubTransport::replying(json!({})),
            StubRepository::new(),
            StubDesign::new(),
        );

        let outcome = orch
            .send_message("draw what you see", None, None)
            .await
            .unwrap();
        let SendOutcome::DesignTriggered { artifact, .. } = outcome else {
            panic!("expected design outcome");
        };
        assert!(artifact.is_none());
        assert_eq!(orch.design.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn design_failure_substitutes_fallback_message() {
        let orch = orchestrator(
            "guest-1",
            StubTransport::replying(json!({})),
            StubRepository::new(),
            StubDesign::failing(),
        );

        let outcome = orch
            .send_message("draw what you see", None, Some("frame"))
            .await
            .unwrap();
        let SendOutcome::DesignTriggered { artifact, .. } = outcome else {
            panic!("expected design outcome");
        };
        assert!(artifact.is_none());

        let messages = orch.messages();
        assert_eq!(messages.last().unwrap().content, DESIGN_FAILED_REPLY);
    }

    #[tokio::test]
    async fn gateway_failure_appends_fallback_and_surfaces_error() {
        let orch = orchestrator(
            "guest-1",
            StubTransport::failing(GatewayError::SendFailed {
                status: 500,
                detail: "boom".to_string(),
            }),
            StubRepository::new(),
            StubDesign::new(),
        );

        let err = orch.send_message("hello", None, None).await.unwrap_err();
        assert!(matches!(err, ChatError::Gateway(_)));

        let messages = orch.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, FALLBACK_REPLY);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert!(!orch.is_composing());
    }

    #[tokio::test]
    async fn insert_failure_never_blocks_the_reply() {
        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "still here"})),
            StubRepository::failing(),
            StubDesign::new(),
        );

        let outcome = orch.send_message("hello", None, None).await.unwrap();
        assert!(matches!(outcome, SendOutcome::Reply(_)));

        let messages = orch.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "still here");
    }

    #[tokio::test]
    async fn second_concurrent_send_is_rejected() {
        let gate = Arc::new(Notify::new());
        let orch = Arc::new(orchestrator(
            "guest-1",
            StubTransport::gated(json!({"text": "slow"}), gate.clone()),
            StubRepository::new(),
            StubDesign::new(),
        ));

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.send_message("one", None, None).await })
        };

        // Wait until the first send is parked inside the transport.
        while orch.gateway.transport().send_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        let err = orch.send_message("two", None, None).await.unwrap_err();
        assert!(matches!(err, ChatError::SendInFlight));

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert!(!orch.is_composing());
    }

    #[tokio::test]
    async fn push_event_with_known_id_is_dropped() {
        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "hi"})),
            StubRepository::new(),
            StubDesign::new(),
        );
        orch.send_message("hello", None, None).await.unwrap();

        let assistant = orch
            .messages()
            .into_iter()
            .find(|m| m.role == MessageRole::Assistant)
            .unwrap();

        // At-least-once push redelivers the durable row.
        orch.apply_event(&MessageEvent::Inserted {
            message: assistant.clone(),
        });
        orch.apply_event(&MessageEvent::Inserted { message: assistant });

        let assistants = orch
            .messages()
            .into_iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count();
        assert_eq!(assistants, 1);
    }

    #[tokio::test]
    async fn push_event_adopts_pending_delivery_by_content() {
        // Guest flow leaves the assistant reply pending (ai- id); the push
        // for the privileged server-side write must merge with it, not
        // duplicate it.
        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "hi there"})),
            StubRepository::failing(),
            StubDesign::new(),
        );
        orch.send_message("hello", None, None).await.unwrap();

        let durable = ChatMessage {
            id: Uuid::now_v7().to_string(),
            user_id: UserId::new("user-1"),
            role: MessageRole::Assistant,
            content: "hi there".to_string(),
            created_at: Utc::now(),
            metadata: None,
        };
        orch.apply_event(&MessageEvent::Inserted {
            message: durable.clone(),
        });

        let messages = orch.messages();
        let assistants: Vec<_> = messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .collect();
        assert_eq!(assistants.len(), 1);
        assert_eq!(assistants[0].id, durable.id);
    }

    #[tokio::test]
    async fn push_event_for_other_user_is_ignored() {
        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "hi"})),
            StubRepository::new(),
            StubDesign::new(),
        );

        orch.apply_event(&MessageEvent::Inserted {
            message: ChatMessage::optimistic(UserId::new("user-2"), "not mine"),
        });
        assert!(orch.messages().is_empty());
    }

    #[tokio::test]
    async fn distinct_replies_with_same_text_outside_window_both_survive() {
        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "hi"})),
            StubRepository::new(),
            StubDesign::new(),
        );

        let mut old = ChatMessage::assistant_reply(UserId::new("user-1"), "ok", None);
        old.created_at = Utc::now() - Duration::minutes(10);
        orch.apply_event(&MessageEvent::Inserted {
            message: old,
        });

        let recent = ChatMessage {
            id: Uuid::now_v7().to_string(),
            user_id: UserId::new("user-1"),
            role: MessageRole::Assistant,
            content: "ok".to_string(),
            created_at: Utc::now(),
            metadata: None,
        };
        orch.apply_event(&MessageEvent::Inserted { message: recent });

        let assistants = orch
            .messages()
            .into_iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count();
        assert_eq!(assistants, 2);
    }

    #[tokio::test]
    async fn load_history_replaces_local_state() {
        let repo = StubRepository::new();
        repo.insert(
            &UserId::new("user-1"),
            MessageRole::User,
            "earlier",
            None,
        )
        .await
        .unwrap();

        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "hi"})),
            repo,
            StubDesign::new(),
        );
        orch.load_history().await.unwrap();

        let messages = orch.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "earlier");
    }

    #[tokio::test]
    async fn local_list_is_bounded() {
        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "hi"})),
            StubRepository::new(),
            StubDesign::new(),
        );

        for n in 0..LOCAL_HISTORY_LIMIT + 50 {
            orch.apply_event(&MessageEvent::Inserted {
                message: ChatMessage {
                    id: Uuid::now_v7().to_string(),
                    user_id: UserId::new("user-1"),
                    role: MessageRole::Assistant,
                    content: format!("reply {n}"),
                    created_at: Utc::now(),
                    metadata: None,
                },
            });
        }

        let messages = orch.messages();
        assert_eq!(messages.len(), LOCAL_HISTORY_LIMIT);
        // The oldest entries were dropped, not the newest.
        assert_eq!(messages.last().unwrap().content, "reply 305");
        assert_eq!(messages[0].content, "reply 50");
    }

    #[tokio::test]
    async fn last_activity_tracks_newest_message() {
        let orch = orchestrator(
            "user-1",
            StubTransport::replying(json!({"text": "hi"})),
            StubRepository::new(),
            StubDesign::new(),
        );

        let before_send = orch.last_activity();
        orch.send_message("hello", None, None).await.unwrap();
        assert!(orch.last_activity() >= before_send);
        assert_eq!(
            orch.last_activity(),
            orch.messages().iter().map(|m| m.created_at).max().unwrap()
        );
    }

    #[tokio::test]
    async fn guest_load_history_is_empty_and_skips_repository() {
        let orch = orchestrator(
            "guest-1",
            StubTransport::replying(json!({"text": "hi"})),
            StubRepository::new(),
            StubDesign::new(),
        );
        orch.load_history().await.unwrap();
        assert!(orch.messages().is_empty());
    }
}
