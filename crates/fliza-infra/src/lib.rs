//! Infrastructure layer for Fliza.
//!
//! Contains implementations of the adapter traits defined in `fliza-core`:
//! the HTTP transport for the remote agent backend, Gemini vision/design
//! clients, and SQLite message storage with realtime insert events.

pub mod agent;
pub mod config;
pub mod gemini;
pub mod sqlite;
