//! Application state
//!
//! Shared by every handler: the service context, the token validator, the
//! loaded configuration and the probes behind `/health/ready`.

use std::sync::Arc;

use counsel_common::{AppConfig, JwtService};
use counsel_core::ReadinessProbe;
use counsel_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    jwt: Arc<JwtService>,
    config: Arc<AppConfig>,
    probes: Arc<Vec<Arc<dyn ReadinessProbe>>>,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        probes: Vec<Arc<dyn ReadinessProbe>>,
    ) -> Self {
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.leeway_secs);
        Self {
            service_context: Arc::new(service_context),
            jwt: Arc::new(jwt),
            config: Arc::new(config),
            probes: Arc::new(probes),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt
    }

    /// Backends checked by the readiness endpoint
    pub fn probes(&self) -> &[Arc<dyn ReadinessProbe>] {
        &self.probes
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &self.config.app.name)
            .field("probes", &self.probes.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}
