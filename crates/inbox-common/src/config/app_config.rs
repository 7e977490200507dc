//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use inbox_core::PlanQuota;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub supabase: SupabaseConfig,
    pub uazapi: UazapiConfig,
    pub gemini: GeminiConfig,
    pub stripe: StripeConfig,
    pub follow_up: FollowUpConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
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

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-request timeout; media uploads and gateway calls happen inline
    pub request_timeout_secs: u64,
    /// Largest accepted request body (base64 media included)
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Supabase project settings (auth + storage)
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// HS256 secret that signs user access tokens
    pub jwt_secret: String,
    /// Service-role key used for storage uploads
    pub service_role_key: String,
    pub storage_bucket: String,
}

/// WhatsApp gateway settings
#[derive(Debug, Clone)]
pub struct UazapiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// LLM settings
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

/// Stripe webhook settings
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub webhook_secret: String,
    /// Accepted clock skew for signed timestamps
    pub tolerance_secs: i64,
    /// price id → plan quota
    pub price_plans: HashMap<String, PlanQuota>,
    /// How long processed event ids are remembered
    pub event_ttl_secs: u64,
}

/// Follow-up queue processor settings
#[derive(Debug, Clone)]
pub struct FollowUpConfig {
    pub poll_interval_secs: u64,
    pub batch_size: i64,
    pub lease_secs: i64,
    pub max_attempts: i32,
    /// Messages of history included in AI prompts
    pub history_limit: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "inbox".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    60
}

fn default_body_limit() -> usize {
    // 16 MiB audio grows by a third when base64 encoded
    24 * 1024 * 1024
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_storage_bucket() -> String {
    "chat-media".to_string()
}

fn default_uazapi_timeout() -> u64 {
    30
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_temperature() -> f32 {
    0.7
}

fn default_gemini_max_output_tokens() -> u32 {
    1024
}

fn default_gemini_timeout() -> u64 {
    60
}

fn default_stripe_tolerance() -> i64 {
    300
}

fn default_stripe_event_ttl() -> u64 {
    86_400
}

fn default_poll_interval() -> u64 {
    60
}

fn default_batch_size() -> i64 {
    50
}

fn default_lease_secs() -> i64 {
    300
}

fn default_max_attempts() -> i32 {
    3
}

fn default_history_limit() -> i64 {
    20
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

/// Read a required variable
fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

/// Read an optional variable, falling back to a default when unset
fn parsed_or<T: FromStr>(name: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        _ => Ok(default()),
    }
}

/// Parse the `STRIPE_PRICE_PLANS` JSON catalog
fn parse_price_plans(raw: Option<String>) -> Result<HashMap<String, PlanQuota>, ConfigError> {
    match raw {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(&json)
            .map_err(|e| ConfigError::InvalidValue("STRIPE_PRICE_PLANS", e.to_string())),
        _ => Ok(HashMap::new()),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: parsed_or("API_PORT", default_port)?,
                request_timeout_secs: parsed_or("API_REQUEST_TIMEOUT_SECS", default_request_timeout)?,
                body_limit_bytes: parsed_or("API_BODY_LIMIT_BYTES", default_body_limit)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parsed_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            redis: RedisConfig {
                url: required("REDIS_URL")?,
                max_connections: parsed_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            supabase: SupabaseConfig {
                url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
                jwt_secret: required("SUPABASE_JWT_SECRET")?,
                service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
                storage_bucket: env::var("SUPABASE_STORAGE_BUCKET")
                    .unwrap_or_else(|_| default_storage_bucket()),
            },
            uazapi: UazapiConfig {
                base_url: required("UAZAPI_BASE_URL")?.trim_end_matches('/').to_string(),
                timeout_secs: parsed_or("UAZAPI_TIMEOUT_SECS", default_uazapi_timeout)?,
            },
            gemini: GeminiConfig {
                api_key: required("GEMINI_API_KEY")?,
                base_url: env::var("GEMINI_BASE_URL")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| default_gemini_base_url()),
                model: env::var("GEMINI_MODEL").unwrap_or_else(|_| default_gemini_model()),
                temperature: parsed_or("GEMINI_TEMPERATURE", default_gemini_temperature)?,
                max_output_tokens: parsed_or(
                    "GEMINI_MAX_OUTPUT_TOKENS",
                    default_gemini_max_output_tokens,
                )?,
                timeout_secs: parsed_or("GEMINI_TIMEOUT_SECS", default_gemini_timeout)?,
            },
            stripe: StripeConfig {
                webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
                tolerance_secs: parsed_or("STRIPE_TOLERANCE_SECS", default_stripe_tolerance)?,
                price_plans: parse_price_plans(env::var("STRIPE_PRICE_PLANS").ok())?,
                event_ttl_secs: parsed_or("STRIPE_EVENT_TTL_SECS", default_stripe_event_ttl)?,
            },
            follow_up: FollowUpConfig {
                poll_interval_secs: parsed_or("FOLLOWUP_POLL_INTERVAL_SECS", default_poll_interval)?,
                batch_size: parsed_or("FOLLOWUP_BATCH_SIZE", default_batch_size)?,
                lease_secs: parsed_or("FOLLOWUP_LEASE_SECS", default_lease_secs)?,
                max_attempts: parsed_or("FOLLOWUP_MAX_ATTEMPTS", default_max_attempts)?,
                history_limit: parsed_or("FOLLOWUP_HISTORY_LIMIT", default_history_limit)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parsed_or(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: parsed_or("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
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
