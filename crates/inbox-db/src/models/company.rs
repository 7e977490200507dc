//! Company and profile database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for companies table
#[derive(Debug, Clone, FromRow)]
pub struct CompanyModel {
    pub id: Uuid,
    pub name: String,
    pub plan: String,
    pub subscription_status: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub max_connections: i32,
    pub max_users: i32,
    pub monthly_ai_credits: i32,
    pub current_period_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for profiles table
#[derive(Debug, Clone, FromRow)]
pub struct ProfileModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub role: String,
    pub full_name: Option<String>,
}
