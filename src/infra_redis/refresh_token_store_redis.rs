use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Keys are `<prefix>:<token>`. Each key expires with the refresh TTL, so
/// Redis drops tokens that the codec would reject anyway.
pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    prefix: String,
    ttl_secs: u64,
}

impl RedisRefreshTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, ttl_secs: u64) -> Self {
        RedisRefreshTokenStore {
            conn,
            prefix: prefix.into(),
            ttl_secs: ttl_secs.max(1),
        }
    }

    fn key(&self, token: &RefreshToken) -> String {
        format!("{}:{}", self.prefix, token.as_str())
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn save(&self, token: &RefreshToken) -> Result<(), SessionError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, "1", self.ttl_secs)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, token: &RefreshToken) -> Result<bool, SessionError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let found: bool = conn
            .exists(&key)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(found)
    }

    async fn delete(&self, token: &RefreshToken) -> Result<(), SessionError> {
        let key = self.key(token);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| SessionError::Store(e.to_string()))?;
        Ok(())
    }
}
