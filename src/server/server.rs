use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

/// Wires the configured backends behind the service ports.
pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub login_service: Arc<dyn LoginService>,
    pub credential_hasher: Arc<dyn CredentialHasher>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let needs_mysql =
            settings.store.backend == "mysql" || settings.credential.backend == "mysql";
        let pool = if needs_mysql {
            let dsn = settings
                .store
                .mysql_dsn
                .as_deref()
                .ok_or_else(|| anyhow!("store.mysql_dsn is required for the mysql backend"))?;
            Some(Pool::<MySql>::connect(dsn).await?)
        } else {
            None
        };

        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::try_new(JwtConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            access_secret: settings.auth.access_secret.clone().into_bytes(),
            refresh_secret: settings.auth.refresh_secret.clone().into_bytes(),
            access_ttl: Duration::from_secs(settings.auth.access_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.auth.refresh_ttl_secs),
            leeway_secs: settings.auth.leeway_secs,
        })?);

        let token_store: Arc<dyn RefreshTokenStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryRefreshTokenStore::new()),
            "mysql" => Arc::new(MySqlRefreshTokenStore::new(mysql(&pool)?)),
            "redis" => {
                let dsn = settings
                    .store
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.redis_dsn is required for the redis backend"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisRefreshTokenStore::new(
                    redis_manager,
                    settings.store.redis_prefix.clone(),
                    settings.auth.refresh_ttl_secs,
                ))
            }
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };

        let credential_repo: Arc<dyn CredentialRepo> = match settings.credential.backend.as_str()
        {
            "memory" => {
                let repo = MemoryCredentialRepo::new();
                for user in &settings.credential.users {
                    repo.insert(CredentialRecord {
                        user_id: user.id.clone(),
                        username: user.username.clone(),
                        password_hash: user.password_hash.clone(),
                    });
                }
                Arc::new(repo)
            }
            "mysql" => Arc::new(MySqlCredentialRepo::new(mysql(&pool)?)),
            other => return Err(anyhow!("Unknown credential backend: {}", other)),
        };

        let session_service: Arc<dyn SessionService> = match settings.session.backend.as_str() {
            "fake" => Arc::new(FakeSessionService::new()),
            "real" => Arc::new(RealSessionService::new(token_codec, token_store)),
            other => return Err(anyhow!("Unknown session backend: {}", other)),
        };

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let credential_verifier: Arc<dyn CredentialVerifier> = Arc::new(
            RealCredentialVerifier::new(credential_repo, credential_hasher.clone()),
        );
        let login_service: Arc<dyn LoginService> = Arc::new(RealLoginService::new(
            credential_verifier,
            session_service.clone(),
        ));

        info!(
            store = %settings.store.backend,
            session = %settings.session.backend,
            "server started"
        );

        Ok(Self {
            session_service,
            login_service,
            credential_hasher,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        info!("server shut down");
    }
}

fn mysql(pool: &Option<Pool<MySql>>) -> anyhow::Result<Pool<MySql>> {
    pool.clone()
        .ok_or_else(|| anyhow!("mysql pool was not initialised"))
}
