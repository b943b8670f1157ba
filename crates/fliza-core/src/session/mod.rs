//! Session cache: user -> (remote session handle, expiry).

pub mod memory;
pub mod store;

pub use memory::InMemorySessionStore;
pub use store::SessionStore;
