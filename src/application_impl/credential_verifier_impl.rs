use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, SessionError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| SessionError::InternalError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, SessionError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| SessionError::InternalError(format!("invalid PHC hash: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(SessionError::InternalError(format!("verify error: {}", e))),
        }
    }
}

pub struct RealCredentialVerifier {
    credential_repo: Arc<dyn CredentialRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl RealCredentialVerifier {
    pub fn new(
        credential_repo: Arc<dyn CredentialRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            credential_repo,
            credential_hasher,
        }
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for RealCredentialVerifier {
    async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IdentityPayload, SessionError> {
        let Some(rec) = self.credential_repo.get_by_username(username).await? else {
            debug!(username, "unknown username");
            return Err(SessionError::InvalidCredentials);
        };

        let ok = self
            .credential_hasher
            .verify_password(password, &rec.password_hash)
            .await?;
        if !ok {
            debug!(username, "password mismatch");
            return Err(SessionError::InvalidCredentials);
        }

        Ok(IdentityPayload {
            id: rec.user_id,
            username: rec.username,
        })
    }
}

#[cfg(test)]
pub(crate) async fn seeded_repo(
    users: &[(&str, &str, &str)],
) -> Arc<crate::infra_memory::MemoryCredentialRepo> {
    let repo = Arc::new(crate::infra_memory::MemoryCredentialRepo::new());
    for (id, username, password) in users {
        let password_hash = Argon2PasswordHasher
            .hash_password(password)
            .await
            .expect("hash");
        repo.insert(CredentialRecord {
            user_id: id.to_string(),
            username: username.to_string(),
            password_hash,
        });
    }
    repo
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn verifier() -> RealCredentialVerifier {
        let repo = seeded_repo(&[("user-1", "alice", "secret")]).await;
        RealCredentialVerifier::new(repo, Arc::new(Argon2PasswordHasher))
    }

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("secret").await.expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify_password("secret", &hash).await.expect("verify"));
        assert!(!hasher.verify_password("wrong", &hash).await.expect("verify"));
    }

    #[tokio::test]
    async fn test_broken_hash_is_internal_error() {
        let result = Argon2PasswordHasher
            .verify_password("secret", "not-a-phc-string")
            .await;
        assert!(matches!(result, Err(SessionError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_verify_yields_identity() {
        let payload = verifier().await.verify("alice", "secret").await.expect("verify");
        assert_eq!(payload, IdentityPayload::new("user-1", "alice"));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let verifier = verifier().await;
        assert!(matches!(
            verifier.verify("alice", "wrong").await,
            Err(SessionError::InvalidCredentials)
        ));
        assert!(matches!(
            verifier.verify("bob", "secret").await,
            Err(SessionError::InvalidCredentials)
        ));
    }
}
