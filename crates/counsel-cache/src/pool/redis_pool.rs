//! Redis connection pool (deadpool-redis).
//!
//! Shared by the event publisher and the readiness probe.

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};

use counsel_core::error::DomainError;
use counsel_core::traits::{ReadinessProbe, RepoResult};

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 10,
        }
    }
}

impl From<&counsel_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &counsel_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Error type for Redis pool operations
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<RedisPoolError> for DomainError {
    fn from(e: RedisPoolError) -> Self {
        match e {
            // Pool exhausted or Redis unreachable
            RedisPoolError::GetConnection(_) => DomainError::StorageUnavailable(e.to_string()),
            RedisPoolError::CreatePool(_)
            | RedisPoolError::Redis(_)
            | RedisPoolError::Serialization(_) => DomainError::CacheError(e.to_string()),
        }
    }
}

/// Result type for Redis pool operations
pub type RedisResult<T> = Result<T, RedisPoolError>;

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    /// Create a new Redis pool with the given configuration.
    ///
    /// No connection is opened until the first command.
    pub fn new(config: RedisPoolConfig) -> RedisResult<Self> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| RedisPoolError::CreatePool(e.to_string()))?;

        // Redact credentials from URL for logging
        let safe_url = config.url.split('@').next_back().unwrap_or(&config.url);
        tracing::info!(
            url = %safe_url,
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    pub fn from_config(config: &counsel_common::RedisConfig) -> RedisResult<Self> {
        Self::new(RedisPoolConfig::from(config))
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> RedisResult<deadpool_redis::Connection> {
        self.pool.get().await.map_err(RedisPoolError::GetConnection)
    }

    /// Check if the pool is healthy by pinging Redis
    pub async fn health_check(&self) -> RedisResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl ReadinessProbe for RedisPool {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self) -> RepoResult<()> {
        self.health_check().await.map_err(DomainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_redis_config() {
        let redis_config = counsel_common::RedisConfig {
            url: "redis://localhost:6380".to_string(),
            max_connections: 32,
        };
        let pool_config = RedisPoolConfig::from(&redis_config);
        assert_eq!(pool_config.url, "redis://localhost:6380");
        assert_eq!(pool_config.max_connections, 32);
    }

    #[tokio::test]
    async fn test_pool_is_lazy() {
        // Nothing listens here; building the pool must still succeed
        let pool = RedisPool::new(RedisPoolConfig {
            url: "redis://127.0.0.1:1".into(),
            max_connections: 1,
        })
        .unwrap();
        assert_eq!(pool.pool.status().size, 0);
        assert!(pool.check().await.is_err());
    }

    #[test]
    fn test_errors_map_to_cache_error() {
        let err = DomainError::from(RedisPoolError::CreatePool("bad url".into()));
        assert_eq!(err.code(), "CACHE_ERROR");

        let err = DomainError::from(RedisPoolError::GetConnection(
            deadpool_redis::PoolError::Closed,
        ));
        assert!(err.is_transient());
    }

    #[test]
    fn test_serialization_error_converts_and_maps() {
        fn encode(raw: &str) -> RedisResult<serde_json::Value> {
            Ok(serde_json::from_str(raw)?)
        }

        let err = encode("{not json").unwrap_err();
        assert!(matches!(err, RedisPoolError::Serialization(_)));

        let err = DomainError::from(err);
        assert_eq!(err.code(), "CACHE_ERROR");
        assert!(!err.is_transient());
    }
}
