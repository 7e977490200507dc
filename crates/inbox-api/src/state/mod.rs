//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! configuration, token validation and the pools probed by readiness checks.

use std::sync::Arc;

use axum::extract::FromRef;
use inbox_cache::RedisPool;
use inbox_common::{AppConfig, JwtService};
use inbox_db::PgPool;
use inbox_service::{Infrastructure, ServiceContext};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    jwt_service: Arc<JwtService>,
    infrastructure: Infrastructure,
}

impl AppState {
    pub fn new(
        service_context: ServiceContext,
        config: AppConfig,
        infrastructure: Infrastructure,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::new(&config.supabase.jwt_secret));
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            jwt_service,
            infrastructure,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn pg_pool(&self) -> &PgPool {
        &self.infrastructure.pg_pool
    }

    pub fn redis_pool(&self) -> &RedisPool {
        &self.infrastructure.redis_pool
    }
}

impl FromRef<AppState> for Arc<JwtService> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_service.clone()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("infrastructure", &self.infrastructure)
            .finish()
    }
}
