//! User identity for Fliza.
//!
//! A user is either authenticated (an identifier issued by the auth
//! provider) or a guest. Guests get a synthetic identifier generated once
//! per process session; the `guest-` prefix is the sole discriminator
//! between the two throughout the system. Guest data is never durably
//! persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix marking a synthetic guest identifier.
pub const GUEST_PREFIX: &str = "guest-";

/// Opaque user identifier, either authenticated or guest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier issued by the auth provider (or an incoming
    /// identifier of unknown provenance -- guests are detected by prefix).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh guest identifier, stable for the lifetime of the
    /// holder but never persisted.
    pub fn new_guest() -> Self {
        Self(format!("{GUEST_PREFIX}{}", Uuid::now_v7().simple()))
    }

    /// Whether this identifier belongs to a guest.
    ///
    /// The prefix check is the only guest/authenticated discriminator in
    /// the system; there is no separate flag.
    pub fn is_guest(&self) -> bool {
        self.0.starts_with(GUEST_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
