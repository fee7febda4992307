//! Server setup and initialization
//!
//! Builds the storage backend chosen by configuration, wires the service
//! context and serves the router.

use std::sync::Arc;

use axum::Router;
use counsel_cache::RedisPool;
use counsel_common::{AppConfig, AppError, StorageBackend};
use counsel_core::{MessageLimits, ReadinessProbe, SnowflakeGenerator};
use counsel_db::{create_pool, run_migrations, MemoryStore, PgReadiness, PoolConfig};
use counsel_service::{ServiceContextBuilder, ServiceError};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_rate_limit};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// # Errors
/// `AppError::Config` if the rate limiter cannot be built
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let api = apply_rate_limit(create_router(), &state.config().rate_limit)?;
    let cors = state.config().cors.clone();
    let is_production = state.config().app.env.is_production();
    let router = api.merge(health_routes()).with_state(state);

    Ok(apply_middleware(router, &cors, is_production))
}

/// Connect the configured backends and create the AppState
///
/// # Errors
/// Fails when PostgreSQL or Redis cannot be reached or migrations fail
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    match config.storage {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            create_memory_app_state(config, &MemoryStore::new())
        }
        StorageBackend::Postgres => create_postgres_app_state(config).await,
    }
}

async fn create_postgres_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let db_config = config
        .database
        .as_ref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for postgres storage".into()))?;

    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(db_config))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(format!("migrations failed: {e}")))?;
    info!("PostgreSQL ready");

    let mut probes: Vec<Arc<dyn ReadinessProbe>> = vec![Arc::new(PgReadiness::new(pool.clone()))];
    let builder = with_redis(
        base_builder(&config).postgres(pool),
        &config,
        &mut probes,
    )?;

    let service_context = builder.build().map_err(config_error)?;
    Ok(AppState::new(service_context, config, probes))
}

/// AppState over an existing in-memory store. Tests use this to seed
/// participants before serving requests.
///
/// # Errors
/// Fails when Redis is configured but its pool cannot be created
pub fn create_memory_app_state(config: AppConfig, store: &MemoryStore) -> Result<AppState, AppError> {
    let mut probes: Vec<Arc<dyn ReadinessProbe>> = vec![Arc::new(store.clone())];
    let builder = with_redis(base_builder(&config).memory(store), &config, &mut probes)?;

    let service_context = builder.build().map_err(config_error)?;
    Ok(AppState::new(service_context, config, probes))
}

fn base_builder(config: &AppConfig) -> ServiceContextBuilder {
    ServiceContextBuilder::new()
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .message_limits(MessageLimits {
            max_content_chars: config.chat.max_message_length,
            max_attachments: config.chat.max_attachments,
        })
}

fn with_redis(
    builder: ServiceContextBuilder,
    config: &AppConfig,
    probes: &mut Vec<Arc<dyn ReadinessProbe>>,
) -> Result<ServiceContextBuilder, AppError> {
    let Some(redis) = config.redis.as_ref() else {
        info!("REDIS_URL not set; events will not be published");
        return Ok(builder);
    };

    let pool = RedisPool::from_config(redis).map_err(|e| AppError::Cache(e.to_string()))?;
    probes.push(Arc::new(pool.clone()));
    info!("Publishing events over Redis");
    Ok(builder.redis(pool))
}

fn config_error(e: ServiceError) -> AppError {
    AppError::Config(e.to_string())
}

/// Serve `app` on an already-bound listener until the process stops
///
/// # Errors
/// Returns `AppError::Internal` if the server loop fails
pub async fn run_server(app: Router, listener: TcpListener) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{}", addr);
    }

    axum::serve(listener, app).await.map_err(AppError::internal)
}

/// Run the complete server with configuration
///
/// # Errors
/// Any startup failure, or a server loop failure
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();
    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;
    run_server(app, listener).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Duration;
    use counsel_common::JwtService;
    use counsel_core::{Actor, Participant, Role, Snowflake};
    use std::collections::HashMap;
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    fn memory_config() -> AppConfig {
        let vars: HashMap<&str, &str> = [
            ("API_PORT", "0"),
            ("JWT_SECRET", SECRET),
            ("STORAGE_BACKEND", "memory"),
            ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000"),
            ("RATE_LIMIT_BURST", "1000"),
        ]
        .into_iter()
        .collect();
        AppConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string())).unwrap()
    }

    fn app() -> Router {
        let store = MemoryStore::new();
        store.insert_participant(Participant {
            id: Snowflake::new(10),
            name: "Dana Reyes".into(),
            email: "dana@example.com".into(),
            avatar: None,
            role: Role::Customer,
        });
        create_app(create_memory_app_state(memory_config(), &store).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_readiness_reports_memory_store() {
        let response = app()
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_bearer_token() {
        let response = app()
            .oneshot(
                Request::get("/api/v1/consultations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_customer_lists_own_consultations() {
        let token = JwtService::new(SECRET, 0)
            .issue(Actor::new(Snowflake::new(10), Role::Customer), Duration::minutes(5))
            .unwrap();
        let response = app()
            .oneshot(
                Request::get("/api/v1/consultations")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_id_is_bad_request() {
        let token = JwtService::new(SECRET, 0)
            .issue(Actor::new(Snowflake::new(10), Role::Customer), Duration::minutes(5))
            .unwrap();
        let response = app()
            .oneshot(
                Request::get("/api/v1/consultations/not-a-number")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
