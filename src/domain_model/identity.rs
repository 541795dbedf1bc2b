use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimal claims carried by both access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityPayload {
    pub id: String,
    pub username: String,
}

impl IdentityPayload {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        IdentityPayload {
            id: id.into(),
            username: username.into(),
        }
    }
}

impl fmt::Display for IdentityPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.username, self.id)
    }
}
