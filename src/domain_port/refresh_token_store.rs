use crate::application_port::*;
use crate::domain_model::*;

/// Durable membership set of refresh tokens that are still usable.
/// The token string itself is the key.
#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert a token. Saving a token that is already present is not an error.
    async fn save(&self, token: &RefreshToken) -> Result<(), SessionError>;

    async fn exists(&self, token: &RefreshToken) -> Result<bool, SessionError>;

    /// Remove a token. Removing a missing token is a no-op.
    async fn delete(&self, token: &RefreshToken) -> Result<(), SessionError>;

    async fn find(&self, token: &RefreshToken) -> Result<(), SessionError> {
        if self.exists(token).await? {
            Ok(())
        } else {
            Err(SessionError::TokenNotFound)
        }
    }
}
