//! # inbox-providers
//!
//! HTTP adapters for the provider ports declared in `inbox-core`:
//!
//! - [`UazapiClient`]: WhatsApp gateway (`MessagingGateway`)
//! - [`GeminiClient`]: reply generation (`ContentGenerator`)
//! - [`SupabaseStorage`]: media uploads (`ObjectStorage`)

pub mod error;
pub mod gemini;
pub mod storage;
pub mod uazapi;

pub use error::{ProviderError, Upstream};
pub use gemini::GeminiClient;
pub use storage::SupabaseStorage;
pub use uazapi::UazapiClient;
