//! Integration test utilities for the inbox backend
//!
//! Spawns the real API against PostgreSQL and Redis, with the WhatsApp
//! gateway, Gemini and Supabase Storage replaced by a local mock server.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
