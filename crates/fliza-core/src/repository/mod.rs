//! Repository trait definitions ("ports" implemented by fliza-infra).

pub mod message;

pub use message::MessageRepository;
