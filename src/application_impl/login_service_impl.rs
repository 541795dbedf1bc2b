use crate::application_port::*;
use crate::domain_model::*;
use std::sync::Arc;

/// Password login: the verifier vouches for the identity, the session
/// service mints the tokens.
pub struct RealLoginService {
    credential_verifier: Arc<dyn CredentialVerifier>,
    session_service: Arc<dyn SessionService>,
}

impl RealLoginService {
    pub fn new(
        credential_verifier: Arc<dyn CredentialVerifier>,
        session_service: Arc<dyn SessionService>,
    ) -> Self {
        Self {
            credential_verifier,
            session_service,
        }
    }
}

#[async_trait::async_trait]
impl LoginService for RealLoginService {
    async fn login(&self, input: LoginInput) -> Result<TokenPair, SessionError> {
        let LoginInput { username, password } = input;
        let identity = self.credential_verifier.verify(&username, &password).await?;
        self.session_service.issue(identity).await
    }
}
