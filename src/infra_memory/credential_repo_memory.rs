use crate::application_port::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Username-keyed credentials, seeded from settings or tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialRepo {
    by_username: DashMap<String, CredentialRecord>,
}

impl MemoryCredentialRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: CredentialRecord) {
        self.by_username.insert(record.username.clone(), record);
    }
}

#[async_trait::async_trait]
impl CredentialRepo for MemoryCredentialRepo {
    async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, SessionError> {
        Ok(self.by_username.get(username).map(|r| r.value().clone()))
    }
}
