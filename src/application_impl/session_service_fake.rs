use crate::application_port::*;
use crate::domain_model::*;

#[derive(Debug, Default)]
pub struct FakeSessionService;

impl FakeSessionService {
    pub fn new() -> Self {
        Self
    }
}

// Deterministic tokens for wiring checks. Nothing is stored, so revoke
// never makes a token unusable here.
#[async_trait::async_trait]
impl SessionService for FakeSessionService {
    async fn issue(&self, payload: IdentityPayload) -> Result<TokenPair, SessionError> {
        Ok(get_fake_pair(&payload))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, SessionError> {
        let payload = parse_fake(refresh_token, "fake-refresh-token:")?;
        Ok(get_fake_pair(&payload).access_token)
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), SessionError> {
        parse_fake(refresh_token, "fake-refresh-token:")?;
        Ok(())
    }

    async fn verify_access_token(
        &self,
        access_token: &str,
    ) -> Result<IdentityPayload, SessionError> {
        parse_fake(access_token, "fake-access-token:")
    }
}

fn parse_fake(token: &str, prefix: &str) -> Result<IdentityPayload, SessionError> {
    token
        .strip_prefix(prefix)
        .and_then(|rest| rest.rsplit_once(':'))
        .map(|(id, username)| IdentityPayload::new(id, username))
        .ok_or(SessionError::TokenNotFound)
}

fn get_fake_pair(payload: &IdentityPayload) -> TokenPair {
    TokenPair {
        access_token: AccessToken(format!(
            "fake-access-token:{}:{}",
            payload.id, payload.username
        )),
        refresh_token: RefreshToken(format!(
            "fake-refresh-token:{}:{}",
            payload.id, payload.username
        )),
    }
}
