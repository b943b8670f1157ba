//! HTTP transport for the remote agent backend.

pub mod http;

pub use http::HttpAgentTransport;
