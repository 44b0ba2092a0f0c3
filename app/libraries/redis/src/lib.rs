use app_error::AppError;
use async_trait::async_trait;
use deadpool_redis::{
    Config, Pool, Runtime,
    redis::AsyncCommands,
};
use tracing::*;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

/// Key/value store for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), AppError>;
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn del(&self, keys: &[&str]) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct Redis {
    pool: Pool,
}

impl Redis {
    /// Builds the pool; connections are opened lazily.
    pub fn new(url: &str) -> Result<Self, AppError> {
        let pool = Config::from_url(url).create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionStore for Redis {
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds.max(1)).await?;
        debug!("SET session {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.pool.get().await?;
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn del(&self, keys: &[&str]) -> Result<(), AppError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(keys).await?;
        debug!("DEL sessions {:?}", keys);
        Ok(())
    }
}
