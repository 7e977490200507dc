//! Route handlers

pub mod follow_ups;
pub mod health;
pub mod messages;
pub mod webhooks;
