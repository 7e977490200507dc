//! # inbox-service
//!
//! Application layer: outbound senders, the follow-up queue processor and
//! Stripe billing sync, written against the ports in `inbox-core`.

pub mod bootstrap;
pub mod dto;
pub mod services;

pub use bootstrap::Infrastructure;
pub use services::{
    Actor, BillingService, Caller, FollowUpService, FollowUpSettings, OutboundService,
    PermissionService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
