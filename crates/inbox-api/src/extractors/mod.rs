//! Axum extractors for request handling

mod auth;
mod validated;

pub use auth::AuthCaller;
pub use validated::ValidatedJson;
