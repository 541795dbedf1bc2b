use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub leeway_secs: u64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("leeway_secs", &self.leeway_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    id: String,
    username: String,
    kind: TokenKind,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String, // keeps same-second tokens distinct
}

impl From<TokenClaims> for IdentityPayload {
    fn from(claims: TokenClaims) -> Self {
        IdentityPayload {
            id: claims.id,
            username: claims.username,
        }
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &[u8]) -> Self {
        KeyPair {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// HS256 codec with one key per token kind, so a leaked access key
/// cannot mint refresh tokens and vice versa.
pub struct JwtHs256Codec {
    cfg: JwtConfig,
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    validation: Validation,
}

impl JwtHs256Codec {
    pub fn try_new(cfg: JwtConfig) -> Result<Self, SessionError> {
        if cfg.access_secret.is_empty() || cfg.refresh_secret.is_empty() {
            return Err(SessionError::Config("signing secrets must not be empty".into()));
        }
        if cfg.access_secret == cfg.refresh_secret {
            return Err(SessionError::Config(
                "access and refresh secrets must differ".into(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = cfg.leeway_secs;
        validation.set_audience(&[cfg.audience.clone()]);
        validation.set_issuer(&[cfg.issuer.clone()]);

        Ok(JwtHs256Codec {
            access_keys: KeyPair::from_secret(&cfg.access_secret),
            refresh_keys: KeyPair::from_secret(&cfg.refresh_secret),
            validation,
            cfg,
        })
    }

    #[inline]
    fn gen_jti() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn encode_claims(
        &self,
        payload: &IdentityPayload,
        kind: TokenKind,
        exp_dt: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let keys = match kind {
            TokenKind::Access => &self.access_keys,
            TokenKind::Refresh => &self.refresh_keys,
        };
        let claims = TokenClaims {
            id: payload.id.clone(),
            username: payload.username.clone(),
            kind,
            exp: exp_dt.timestamp(),
            iat: Utc::now().timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: Self::gen_jti(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| SessionError::InternalError(e.to_string()))
    }

    fn decode_claims(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, SessionError> {
        let keys = match kind {
            TokenKind::Access => &self.access_keys,
            TokenKind::Refresh => &self.refresh_keys,
        };
        let data = decode::<TokenClaims>(token, &keys.decoding, &self.validation)
            .map_err(|e| SessionError::TokenInvalid(rejection_for(e.kind())))?;
        // Unreachable while the two secrets differ; holds if they are ever shared.
        if data.claims.kind != kind {
            return Err(SessionError::TokenInvalid(TokenRejection::WrongKind));
        }
        Ok(data.claims)
    }

    #[cfg(test)]
    pub(crate) fn refresh_token_expiring_at(
        &self,
        payload: &IdentityPayload,
        exp_dt: DateTime<Utc>,
    ) -> RefreshToken {
        RefreshToken(
            self.encode_claims(payload, TokenKind::Refresh, exp_dt)
                .expect("encode refresh token"),
        )
    }
}

fn rejection_for(kind: &ErrorKind) -> TokenRejection {
    match kind {
        ErrorKind::ExpiredSignature => TokenRejection::Expired,
        ErrorKind::InvalidSignature => TokenRejection::BadSignature,
        _ => TokenRejection::Malformed,
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn generate_access_token(
        &self,
        payload: &IdentityPayload,
    ) -> Result<AccessToken, SessionError> {
        let exp_dt = Utc::now() + self.cfg.access_ttl;
        let token = self.encode_claims(payload, TokenKind::Access, exp_dt)?;
        Ok(AccessToken(token))
    }

    async fn generate_refresh_token(
        &self,
        payload: &IdentityPayload,
    ) -> Result<RefreshToken, SessionError> {
        let exp_dt = Utc::now() + self.cfg.refresh_ttl;
        let token = self.encode_claims(payload, TokenKind::Refresh, exp_dt)?;
        Ok(RefreshToken(token))
    }

    async fn verify_access_token(
        &self,
        token: &AccessToken,
    ) -> Result<IdentityPayload, SessionError> {
        let claims = self.decode_claims(&token.0, TokenKind::Access)?;
        Ok(claims.into())
    }

    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<IdentityPayload, SessionError> {
        let claims = self.decode_claims(&token.0, TokenKind::Refresh)?;
        Ok(claims.into())
    }

    fn decode_payload(&self, token: &str) -> Result<IdentityPayload, SessionError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.insecure_disable_signature_validation();
        v.validate_exp = false;
        v.validate_aud = false;
        v.required_spec_claims.clear();
        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &v)
            .map_err(|_| SessionError::TokenInvalid(TokenRejection::Malformed))?;
        Ok(data.claims.into())
    }
}

#[cfg(test)]
pub(crate) fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        issuer: "sessionkeep.test".to_string(),
        audience: "sessionkeep-client".to_string(),
        access_secret: b"access-secret-for-tests".to_vec(),
        refresh_secret: b"refresh-secret-for-tests".to_vec(),
        access_ttl: Duration::from_secs(30 * 60),
        refresh_ttl: Duration::from_secs(14 * 24 * 60 * 60),
        leeway_secs: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> IdentityPayload {
        IdentityPayload::new("1", "alice")
    }

    fn codec() -> JwtHs256Codec {
        JwtHs256Codec::try_new(test_jwt_config()).expect("codec")
    }

    #[test]
    fn test_rejects_shared_or_empty_secrets() {
        let mut cfg = test_jwt_config();
        cfg.refresh_secret = cfg.access_secret.clone();
        assert!(matches!(
            JwtHs256Codec::try_new(cfg),
            Err(SessionError::Config(_))
        ));

        let mut cfg = test_jwt_config();
        cfg.access_secret.clear();
        assert!(matches!(
            JwtHs256Codec::try_new(cfg),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", test_jwt_config());
        assert!(!rendered.contains("access-secret-for-tests"));
        assert!(!rendered.contains("refresh-secret-for-tests"));
    }

    #[tokio::test]
    async fn test_refresh_token_verifies_to_payload() {
        let codec = codec();
        let token = codec.generate_refresh_token(&alice()).await.expect("issue");
        let payload = codec.verify_refresh_token(&token).await.expect("verify");
        assert_eq!(payload, alice());
    }

    #[tokio::test]
    async fn test_access_token_verifies_to_payload() {
        let codec = codec();
        let token = codec.generate_access_token(&alice()).await.expect("issue");
        let payload = codec.verify_access_token(&token).await.expect("verify");
        assert_eq!(payload, alice());
    }

    #[tokio::test]
    async fn test_same_second_tokens_differ() {
        let codec = codec();
        let a = codec.generate_access_token(&alice()).await.expect("issue");
        let b = codec.generate_access_token(&alice()).await.expect("issue");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_access_token_is_not_a_refresh_token() {
        let codec = codec();
        let access = codec.generate_access_token(&alice()).await.expect("issue");
        let result = codec
            .verify_refresh_token(&RefreshToken(access.0.clone()))
            .await;
        assert!(matches!(
            result,
            Err(SessionError::TokenInvalid(TokenRejection::BadSignature))
        ));
    }

    #[tokio::test]
    async fn test_kind_claim_is_checked_after_signature() {
        let codec = codec();
        let claims = TokenClaims {
            id: "1".to_string(),
            username: "alice".to_string(),
            kind: TokenKind::Access,
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
            iss: codec.cfg.issuer.clone(),
            aud: codec.cfg.audience.clone(),
            jti: JwtHs256Codec::gen_jti(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &codec.refresh_keys.encoding,
        )
        .expect("encode");

        let result = codec.verify_refresh_token(&RefreshToken(token)).await;
        assert!(matches!(
            result,
            Err(SessionError::TokenInvalid(TokenRejection::WrongKind))
        ));
    }

    #[tokio::test]
    async fn test_foreign_secret_is_rejected() {
        let mut cfg = test_jwt_config();
        cfg.refresh_secret = b"someone-elses-refresh-secret".to_vec();
        let forger = JwtHs256Codec::try_new(cfg).expect("codec");
        let forged = forger.generate_refresh_token(&alice()).await.expect("issue");

        let result = codec().verify_refresh_token(&forged).await;
        assert!(matches!(
            result,
            Err(SessionError::TokenInvalid(TokenRejection::BadSignature))
        ));
    }

    #[tokio::test]
    async fn test_expired_refresh_token_is_rejected() {
        let codec = codec();
        let expired =
            codec.refresh_token_expiring_at(&alice(), Utc::now() - chrono::Duration::hours(1));
        let result = codec.verify_refresh_token(&expired).await;
        assert!(matches!(
            result,
            Err(SessionError::TokenInvalid(TokenRejection::Expired))
        ));
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let result = codec()
            .verify_refresh_token(&RefreshToken("garbage-string".to_string()))
            .await;
        assert!(matches!(
            result,
            Err(SessionError::TokenInvalid(TokenRejection::Malformed))
        ));
    }

    #[tokio::test]
    async fn test_decode_payload_skips_verification() {
        let codec = codec();
        let expired =
            codec.refresh_token_expiring_at(&alice(), Utc::now() - chrono::Duration::hours(1));
        assert_eq!(codec.decode_payload(&expired.0).expect("decode"), alice());

        let access = codec.generate_access_token(&alice()).await.expect("issue");
        assert_eq!(codec.decode_payload(&access.0).expect("decode"), alice());

        assert!(codec.decode_payload("not.a.jwt").is_err());
    }
}
