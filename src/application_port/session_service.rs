use crate::domain_model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    #[error("malformed")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("expired")]
    Expired,
    #[error("wrong token kind")]
    WrongKind,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token invalid: {0}")]
    TokenInvalid(TokenRejection),
    #[error("token not found")]
    TokenNotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("store error: {0}")]
    Store(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl SessionError {
    /// Rejections caused by what the caller sent, as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SessionError::TokenInvalid(_)
                | SessionError::TokenNotFound
                | SessionError::InvalidCredentials
        )
    }
}

/// Signs and verifies tokens. Implementations are stateless.
#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn generate_access_token(
        &self,
        payload: &IdentityPayload,
    ) -> Result<AccessToken, SessionError>;
    async fn generate_refresh_token(
        &self,
        payload: &IdentityPayload,
    ) -> Result<RefreshToken, SessionError>;
    async fn verify_access_token(
        &self,
        token: &AccessToken,
    ) -> Result<IdentityPayload, SessionError>;
    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<IdentityPayload, SessionError>;
    /// Reads the claims without checking signature or expiry.
    /// Only for tokens that were verified elsewhere.
    fn decode_payload(&self, token: &str) -> Result<IdentityPayload, SessionError>;
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Mints an access/refresh pair and persists the refresh token.
    async fn issue(&self, payload: IdentityPayload) -> Result<TokenPair, SessionError>;
    /// Mints a new access token from a stored, valid refresh token.
    /// The refresh token itself is left untouched.
    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, SessionError>;
    /// Deletes a stored, valid refresh token.
    async fn revoke(&self, refresh_token: &str) -> Result<(), SessionError>;
    async fn verify_access_token(&self, access_token: &str)
    -> Result<IdentityPayload, SessionError>;
}
