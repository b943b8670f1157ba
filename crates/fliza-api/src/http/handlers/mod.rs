//! HTTP request handlers.

pub mod chat;
pub mod design;
pub mod history;
pub mod vision;
pub mod ws;
