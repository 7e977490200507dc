//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] and orchestrates the
//! domain ports for one use case.

pub mod billing;
pub mod context;
pub mod error;
pub mod follow_up;
pub mod outbound;
pub mod permission;

#[cfg(test)]
pub(crate) mod testing;

pub use billing::BillingService;
pub use context::{FollowUpSettings, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use follow_up::FollowUpService;
pub use outbound::OutboundService;
pub use permission::{Actor, Caller, PermissionService};
