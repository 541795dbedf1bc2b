use crate::application_port::*;

#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub user_id: String,
    pub username: String,
    pub password_hash: String,
}

#[async_trait::async_trait]
pub trait CredentialRepo: Send + Sync {
    /// Fetch credentials by username (for login).
    async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, SessionError>;
}
