use crate::application_port::*;
use crate::domain_port::*;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlCredentialRepo {
    pool: MySqlPool,
}

impl MySqlCredentialRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlCredentialRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<CredentialRecord, SessionError> {
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| SessionError::Store(e.to_string()))?;
        let username: String = row
            .try_get("username")
            .map_err(|e| SessionError::Store(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| SessionError::Store(e.to_string()))?;

        Ok(CredentialRecord {
            user_id,
            username,
            password_hash,
        })
    }
}

#[async_trait::async_trait]
impl CredentialRepo for MySqlCredentialRepo {
    async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, SessionError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, username, password_hash
FROM user_credential
WHERE username = ?
"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}
