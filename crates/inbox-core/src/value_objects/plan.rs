//! Plan quotas written onto a company when its subscription changes

use serde::{Deserialize, Serialize};

/// Limits granted by a billing plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanQuota {
    pub plan: String,
    pub max_connections: i32,
    pub max_users: i32,
    #[serde(default)]
    pub monthly_ai_credits: i32,
}

impl PlanQuota {
    /// Quota applied when a subscription ends
    pub fn free() -> Self {
        Self {
            plan: "free".to_string(),
            max_connections: 1,
            max_users: 2,
            monthly_ai_credits: 100,
        }
    }
}
