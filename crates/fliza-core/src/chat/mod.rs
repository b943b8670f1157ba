//! Chat orchestration: optimistic local state, persistence reconciliation,
//! and dedup against the realtime push channel.

pub mod orchestrator;

pub use orchestrator::{ChatOrchestrator, SendOutcome};
