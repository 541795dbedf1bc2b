use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashSet;

/// Process-local store. Sharded, so concurrent callers on different
/// tokens do not contend on one lock.
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenStore {
    tokens: DashSet<String>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn save(&self, token: &RefreshToken) -> Result<(), SessionError> {
        self.tokens.insert(token.0.clone());
        Ok(())
    }

    async fn exists(&self, token: &RefreshToken) -> Result<bool, SessionError> {
        Ok(self.tokens.contains(token.as_str()))
    }

    async fn delete(&self, token: &RefreshToken) -> Result<(), SessionError> {
        self.tokens.remove(token.as_str());
        Ok(())
    }
}
