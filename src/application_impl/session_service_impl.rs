use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

/// Issues, refreshes and revokes sessions.
///
/// `refresh` and `revoke` check store membership first and the signature
/// second. An unknown string therefore fails with `TokenNotFound`, while an
/// expired token that is still stored fails with `TokenInvalid`. Refresh
/// tokens are never rotated.
pub struct RealSessionService {
    token_codec: Arc<dyn TokenCodec>,
    token_store: Arc<dyn RefreshTokenStore>,
}

impl RealSessionService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        token_store: Arc<dyn RefreshTokenStore>,
    ) -> Self {
        Self {
            token_codec,
            token_store,
        }
    }

    async fn check_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<IdentityPayload, SessionError> {
        self.token_store.find(refresh_token).await?;
        self.token_codec.verify_refresh_token(refresh_token).await
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn issue(&self, payload: IdentityPayload) -> Result<TokenPair, SessionError> {
        let access_token = self.token_codec.generate_access_token(&payload).await?;
        let refresh_token = self.token_codec.generate_refresh_token(&payload).await?;

        self.token_store.save(&refresh_token).await.map_err(|e| {
            warn!(user_id = %payload.id, "refresh token not persisted: {}", e);
            e
        })?;

        info!(user_id = %payload.id, username = %payload.username, "session issued");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, SessionError> {
        let refresh_token = RefreshToken(refresh_token.to_string());
        let payload = self.check_refresh_token(&refresh_token).await?;

        let access_token = self.token_codec.generate_access_token(&payload).await?;

        debug!(user_id = %payload.id, "access token refreshed");
        Ok(access_token)
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), SessionError> {
        let refresh_token = RefreshToken(refresh_token.to_string());
        let payload = self.check_refresh_token(&refresh_token).await?;

        self.token_store.delete(&refresh_token).await?;

        info!(user_id = %payload.id, "session revoked");
        Ok(())
    }

    async fn verify_access_token(
        &self,
        access_token: &str,
    ) -> Result<IdentityPayload, SessionError> {
        self.token_codec
            .verify_access_token(&AccessToken(access_token.to_string()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtHs256Codec, test_jwt_config};
    use crate::infra_memory::MemoryRefreshTokenStore;
    use chrono::Utc;

    struct Harness {
        codec: Arc<JwtHs256Codec>,
        store: Arc<MemoryRefreshTokenStore>,
        service: RealSessionService,
    }

    fn harness() -> Harness {
        let codec = Arc::new(JwtHs256Codec::try_new(test_jwt_config()).expect("codec"));
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let service = RealSessionService::new(codec.clone(), store.clone());
        Harness {
            codec,
            store,
            service,
        }
    }

    fn alice() -> IdentityPayload {
        IdentityPayload::new("1", "alice")
    }

    struct UnwritableStore;

    #[async_trait::async_trait]
    impl RefreshTokenStore for UnwritableStore {
        async fn save(&self, _token: &RefreshToken) -> Result<(), SessionError> {
            Err(SessionError::Store("connection refused".to_string()))
        }

        async fn exists(&self, _token: &RefreshToken) -> Result<bool, SessionError> {
            Ok(false)
        }

        async fn delete(&self, _token: &RefreshToken) -> Result<(), SessionError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_issue_persists_refresh_token() {
        let h = harness();
        let pair = h.service.issue(alice()).await.expect("issue");

        assert!(h.store.exists(&pair.refresh_token).await.expect("exists"));
        assert_eq!(h.codec.decode_payload(&pair.access_token.0).expect("decode"), alice());
        assert_eq!(h.codec.decode_payload(&pair.refresh_token.0).expect("decode"), alice());
    }

    #[tokio::test]
    async fn test_issue_fails_when_store_write_fails() {
        let codec = Arc::new(JwtHs256Codec::try_new(test_jwt_config()).expect("codec"));
        let service = RealSessionService::new(codec, Arc::new(UnwritableStore));

        let result = service.issue(alice()).await;
        assert!(matches!(result, Err(SessionError::Store(_))));
    }

    #[tokio::test]
    async fn test_refresh_does_not_rotate() {
        let h = harness();
        let pair = h.service.issue(alice()).await.expect("issue");

        for _ in 0..3 {
            let access = h
                .service
                .refresh(pair.refresh_token.as_str())
                .await
                .expect("refresh");
            assert_ne!(access, pair.access_token);
            assert_eq!(h.codec.decode_payload(access.as_str()).expect("decode"), alice());
        }
        assert_eq!(h.store.len(), 1);
    }

    #[tokio::test]
    async fn test_lifecycle_issue_refresh_revoke() {
        let h = harness();
        let pair = h.service.issue(alice()).await.expect("issue");

        let access = h
            .service
            .refresh(pair.refresh_token.as_str())
            .await
            .expect("refresh");
        assert_eq!(
            h.service
                .verify_access_token(access.as_str())
                .await
                .expect("verify"),
            alice()
        );

        h.service
            .revoke(pair.refresh_token.as_str())
            .await
            .expect("revoke");

        assert!(matches!(
            h.service.refresh(pair.refresh_token.as_str()).await,
            Err(SessionError::TokenNotFound)
        ));
        assert!(matches!(
            h.service.revoke(pair.refresh_token.as_str()).await,
            Err(SessionError::TokenNotFound)
        ));
    }

    #[tokio::test]
    async fn test_garbage_token_is_not_found() {
        let h = harness();
        let refreshed = h.service.refresh("garbage-string").await;
        let revoked = h.service.revoke("garbage-string").await;

        for result in [refreshed.map(|_| ()), revoked] {
            let err = result.expect_err("garbage must be rejected");
            assert!(matches!(err, SessionError::TokenNotFound));
            assert!(err.is_client_error());
        }
    }

    #[tokio::test]
    async fn test_expired_token_in_store_is_invalid_and_kept() {
        let h = harness();
        let expired = h
            .codec
            .refresh_token_expiring_at(&alice(), Utc::now() - chrono::Duration::minutes(5));
        h.store.save(&expired).await.expect("save");

        assert!(matches!(
            h.service.refresh(expired.as_str()).await,
            Err(SessionError::TokenInvalid(TokenRejection::Expired))
        ));
        assert!(matches!(
            h.service.revoke(expired.as_str()).await,
            Err(SessionError::TokenInvalid(TokenRejection::Expired))
        ));
        assert!(h.store.exists(&expired).await.expect("exists"));
    }

    #[tokio::test]
    async fn test_revoke_never_deletes_unverifiable_token() {
        let h = harness();
        let planted = RefreshToken("planted-by-someone".to_string());
        h.store.save(&planted).await.expect("save");

        let result = h.service.revoke(planted.as_str()).await;
        assert!(matches!(
            result,
            Err(SessionError::TokenInvalid(TokenRejection::Malformed))
        ));
        assert!(h.store.exists(&planted).await.expect("exists"));
    }

    #[tokio::test]
    async fn test_access_token_cannot_refresh() {
        let h = harness();
        let pair = h.service.issue(alice()).await.expect("issue");

        let result = h.service.refresh(pair.access_token.as_str()).await;
        assert!(matches!(result, Err(SessionError::TokenNotFound)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_revoke_deletes_once() {
        let h = harness();
        let pair = h.service.issue(alice()).await.expect("issue");
        let service = Arc::new(h.service);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let token = pair.refresh_token.0.clone();
                tokio::spawn(async move { service.revoke(&token).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.expect("join") {
                Ok(()) => ok += 1,
                Err(e) => assert!(matches!(e, SessionError::TokenNotFound)),
            }
        }
        assert!(ok >= 1);
        assert!(h.store.is_empty());
    }
}
