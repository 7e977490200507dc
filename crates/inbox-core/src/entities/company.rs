//! Company entity - the tenant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::PlanQuota;

/// Billing state mirrored from Stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Inactive,
    Trialing,
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
        }
    }

    /// Parse a stored status or a Stripe subscription status.
    ///
    /// Stripe statuses without a local counterpart (`incomplete`, `unpaid`, ...)
    /// collapse to `PastDue` or `Inactive`.
    pub fn parse(value: &str) -> Self {
        match value {
            "trialing" => Self::Trialing,
            "active" => Self::Active,
            "past_due" | "unpaid" => Self::PastDue,
            "canceled" | "incomplete_expired" => Self::Canceled,
            _ => Self::Inactive,
        }
    }
}

/// Company (tenant) entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub plan: String,
    pub subscription_status: SubscriptionStatus,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub max_connections: i32,
    pub max_users: i32,
    pub monthly_ai_credits: i32,
    pub current_period_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Overwrite plan and quota fields
    pub fn apply_quota(&mut self, quota: &PlanQuota) {
        self.plan.clone_from(&quota.plan);
        self.max_connections = quota.max_connections;
        self.max_users = quota.max_users;
        self.monthly_ai_credits = quota.monthly_ai_credits;
    }

    #[inline]
    pub fn has_active_subscription(&self) -> bool {
        matches!(
            self.subscription_status,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing
        )
    }
}
