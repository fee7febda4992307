//! Application configuration structs
//!
//! Loaded from environment variables (optionally seeded from a `.env` file).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub storage: StorageBackend,
    /// Required for the `postgres` backend
    pub database: Option<DatabaseConfig>,
    /// Event fan-out is disabled when absent
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub chat: ChatConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Where consultations and messages are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local store; data is lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Bearer token validation. Tokens are issued by the identity service.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Clock skew tolerated on `exp`, in seconds
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

/// Limits applied to chat messages
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_attachments: default_max_attachments(),
            max_message_length: default_max_message_length(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "counsel".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_jwt_leeway() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_max_attachments() -> usize {
    10
}

fn default_max_message_length() -> usize {
    5000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let storage = vars.parsed_or("STORAGE_BACKEND", StorageBackend::default)?;
        let database = match vars.get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: vars.parsed_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: vars.parsed_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                acquire_timeout_secs: vars
                    .parsed_or("DATABASE_ACQUIRE_TIMEOUT_SECS", default_acquire_timeout)?,
            }),
            None if storage == StorageBackend::Postgres => {
                return Err(ConfigError::MissingVar("DATABASE_URL"))
            }
            None => None,
        };

        let redis = match vars.get("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: vars
                    .parsed_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            }),
            None => None,
        };

        let worker_id: u16 = vars.parsed_or("WORKER_ID", || 0)?;
        if worker_id >= 1024 {
            return Err(ConfigError::InvalidValue("WORKER_ID", worker_id.to_string()));
        }

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars.parsed_or("APP_ENV", Environment::default)?,
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars.required_parsed("API_PORT")?,
            },
            storage,
            database,
            redis,
            jwt: JwtConfig {
                secret: vars.required("JWT_SECRET")?,
                leeway_secs: vars.parsed_or("JWT_LEEWAY_SECS", default_jwt_leeway)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: vars
                    .parsed_or("RATE_LIMIT_REQUESTS_PER_SECOND", default_requests_per_second)?,
                burst: vars.parsed_or("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig { worker_id },
            chat: ChatConfig {
                max_attachments: vars.parsed_or("CHAT_MAX_ATTACHMENTS", default_max_attachments)?,
                max_message_length: vars
                    .parsed_or("CHAT_MAX_MESSAGE_LENGTH", default_max_message_length)?,
            },
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::MissingVar(key))
    }

    fn required_parsed<T: FromStr>(&self, key: &'static str) -> Result<T, ConfigError> {
        let raw = self.required(key)?;
        raw.trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw))
    }

    fn parsed_or<T: FromStr>(
        &self,
        key: &'static str,
        default: impl FnOnce() -> T,
    ) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(default()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_memory_backend_needs_no_database() {
        let config = load(&[
            ("API_PORT", "8080"),
            ("JWT_SECRET", "s3cret"),
            ("STORAGE_BACKEND", "memory"),
        ])
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.database.is_none());
        assert!(config.redis.is_none());
        assert_eq!(config.chat.max_message_length, 5000);
        assert_eq!(config.chat.max_attachments, 10);
        assert_eq!(config.api.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        let err = load(&[("API_PORT", "8080"), ("JWT_SECRET", "s3cret")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        let err = load(&[
            ("API_PORT", "eighty"),
            ("JWT_SECRET", "s3cret"),
            ("STORAGE_BACKEND", "memory"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("API_PORT", _)));

        let err = load(&[
            ("API_PORT", "80"),
            ("JWT_SECRET", "s3cret"),
            ("STORAGE_BACKEND", "memory"),
            ("WORKER_ID", "5000"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("WORKER_ID", _)));
    }

    #[test]
    fn test_full_configuration() {
        let config = load(&[
            ("APP_ENV", "Production"),
            ("API_HOST", "0.0.0.0"),
            ("API_PORT", "3000"),
            ("DATABASE_URL", "postgres://localhost/counsel"),
            ("DATABASE_MAX_CONNECTIONS", "40"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("JWT_SECRET", "s3cret"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("CHAT_MAX_ATTACHMENTS", "3"),
        ])
        .unwrap();

        assert!(config.app.env.is_production());
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.database.unwrap().max_connections, 40);
        assert_eq!(config.redis.unwrap().max_connections, 10);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.chat.max_attachments, 3);
    }
}
