//! Business logic and adapter trait definitions for Fliza.
//!
//! This crate defines the "ports" (transport, store, repository, and media
//! traits) that the infrastructure layer implements, plus the logic with
//! actual state: the session cache, the agent gateway, the design-intent
//! classifier, the realtime message bus, and the chat orchestrator.
//!
//! Depends only on `fliza-types` -- never on `fliza-infra` or any
//! database/HTTP crate.

pub mod agent;
pub mod chat;
pub mod event;
pub mod media;
pub mod repository;
pub mod session;
