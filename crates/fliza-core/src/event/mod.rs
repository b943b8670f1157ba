//! Realtime push channel for message-store inserts.

pub mod bus;

pub use bus::MessageBus;
