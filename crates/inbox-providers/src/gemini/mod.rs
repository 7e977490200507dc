//! Gemini `generateContent` adapter.

mod client;
mod types;

pub use client::GeminiClient;
