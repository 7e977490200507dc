//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, FollowUpConfig,
    GeminiConfig, RateLimitConfig, RedisConfig, ServerConfig, StripeConfig, SupabaseConfig,
    UazapiConfig,
};
