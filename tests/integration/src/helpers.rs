//! Test helpers for integration tests
//!
//! Spawns the API on an ephemeral port with its upstream providers pointed at
//! a `wiremock` server, and wraps the HTTP calls tests make against it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use inbox_api::{create_app, AppState};
use inbox_common::{
    AppConfig, AppSettings, Claims, CorsConfig, DatabaseConfig, Environment, FollowUpConfig,
    GeminiConfig, RateLimitConfig, RedisConfig, ServerConfig, StripeConfig, SupabaseConfig,
    UazapiConfig,
};
use inbox_core::PlanQuota;
use inbox_service::Infrastructure;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;
use wiremock::MockServer;

pub const JWT_SECRET: &str = "integration-test-jwt-secret-with-32-plus-chars";
pub const WEBHOOK_SECRET: &str = "whsec_integration";
pub const PRO_PRICE: &str = "price_pro_monthly";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: AppState,
    /// Stands in for UAZAPI, Gemini and Supabase Storage
    pub upstream: MockServer,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with migrated storage
    pub async fn start() -> Result<Self> {
        let upstream = MockServer::start().await;
        let config = test_config(&upstream.uri())?;

        let infrastructure = Infrastructure::connect(&config).await?;
        infrastructure.migrate(migrations_dir()).await?;
        let context = infrastructure.service_context(&config)?;

        let state = AppState::new(context, config, infrastructure);
        let app = create_app(state.clone())?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            state,
            upstream,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn pool(&self) -> &PgPool {
        self.state.pg_pool()
    }

    /// Access token for a signed-in user
    pub fn user_token(&self, user_id: Uuid) -> Result<String> {
        Ok(self
            .state
            .jwt_service()
            .encode(&Claims::for_user(user_id, 3600))?)
    }

    /// Token equivalent to the project's service-role key
    pub fn service_token(&self) -> Result<String> {
        Ok(self.state.jwt_service().encode(&Claims::service_role(3600))?)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with JSON body and no credentials
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await?)
    }

    /// Deliver a raw Stripe webhook body
    pub async fn post_webhook(&self, payload: &[u8], signature: Option<&str>) -> Result<Response> {
        let url = format!("{}/api/v1/webhooks/stripe", self.base_url());
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(payload.to_vec());
        if let Some(signature) = signature {
            request = request.header("Stripe-Signature", signature);
        }
        Ok(request.send().await?)
    }
}

/// Configuration for a test server whose providers live at `upstream`
///
/// Only `DATABASE_URL` and `REDIS_URL` come from the environment.
pub fn test_config(upstream: &str) -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut price_plans = HashMap::new();
    price_plans.insert(
        PRO_PRICE.to_string(),
        PlanQuota {
            plan: "pro".to_string(),
            max_connections: 5,
            max_users: 10,
            monthly_ai_credits: 1000,
        },
    );

    Ok(AppConfig {
        app: AppSettings {
            name: "inbox-test".to_string(),
            env: Environment::Development,
        },
        api: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            body_limit_bytes: 24 * 1024 * 1024,
        },
        database: DatabaseConfig {
            url: std::env::var("DATABASE_URL")?,
            max_connections: 5,
            min_connections: 1,
        },
        redis: RedisConfig {
            url: std::env::var("REDIS_URL")?,
            max_connections: 5,
        },
        supabase: SupabaseConfig {
            url: upstream.to_string(),
            jwt_secret: JWT_SECRET.to_string(),
            service_role_key: "service-role-key".to_string(),
            storage_bucket: "chat-media".to_string(),
        },
        uazapi: UazapiConfig {
            base_url: upstream.to_string(),
            timeout_secs: 5,
        },
        gemini: GeminiConfig {
            api_key: "gemini-test-key".to_string(),
            base_url: upstream.to_string(),
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.7,
            max_output_tokens: 256,
            timeout_secs: 5,
        },
        stripe: StripeConfig {
            webhook_secret: WEBHOOK_SECRET.to_string(),
            tolerance_secs: 300,
            price_plans,
            event_ttl_secs: 3600,
        },
        follow_up: FollowUpConfig {
            poll_interval_secs: 60,
            batch_size: 50,
            lease_secs: 300,
            max_attempts: 3,
            history_limit: 20,
        },
        rate_limit: RateLimitConfig {
            requests_per_second: 1000,
            burst: 1000,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
    })
}

/// `migrations/` at the workspace root
pub fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../migrations")
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();

    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
