//! Shared domain types for Fliza.
//!
//! This crate contains the core domain types used across the Fliza chat
//! platform: messages, agent sessions, user identity, realtime events,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod message;
pub mod session;
