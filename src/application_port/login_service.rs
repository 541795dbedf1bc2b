use super::SessionError;
use crate::domain_model::*;

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, SessionError>;
    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, SessionError>;
}

/// Turns a username/password pair into the identity that goes into tokens.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str)
    -> Result<IdentityPayload, SessionError>;
}

#[async_trait::async_trait]
pub trait LoginService: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<TokenPair, SessionError>;
}
