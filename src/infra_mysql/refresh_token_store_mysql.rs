use super::util::is_dup_key;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::MySqlPool;

/// Backed by `refresh_token`, whose primary key is the token string.
pub struct MySqlRefreshTokenStore {
    pool: MySqlPool,
}

impl MySqlRefreshTokenStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRefreshTokenStore { pool }
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MySqlRefreshTokenStore {
    async fn save(&self, token: &RefreshToken) -> Result<(), SessionError> {
        let result = sqlx::query(
            r#"
INSERT INTO refresh_token (token)
VALUES (?)
"#,
        )
        .bind(token.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_dup_key(&e) => Ok(()),
            Err(e) => Err(SessionError::Store(e.to_string())),
        }
    }

    async fn exists(&self, token: &RefreshToken) -> Result<bool, SessionError> {
        let found: Option<i64> = sqlx::query_scalar(
            r#"
SELECT 1
FROM refresh_token
WHERE token = ?
"#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::Store(e.to_string()))?;

        Ok(found.is_some())
    }

    async fn delete(&self, token: &RefreshToken) -> Result<(), SessionError> {
        sqlx::query(
            r#"
DELETE FROM refresh_token
WHERE token = ?
"#,
        )
        .bind(token.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::Store(e.to_string()))?;

        Ok(())
    }
}
