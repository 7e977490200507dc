//! Company and profile model -> entity mappers

use inbox_core::entities::{Company, MemberRole, Profile, SubscriptionStatus};

use crate::models::{CompanyModel, ProfileModel};

impl From<CompanyModel> for Company {
    fn from(model: CompanyModel) -> Self {
        Company {
            id: model.id,
            name: model.name,
            plan: model.plan,
            subscription_status: SubscriptionStatus::parse(&model.subscription_status),
            stripe_customer_id: model.stripe_customer_id,
            stripe_subscription_id: model.stripe_subscription_id,
            max_connections: model.max_connections,
            max_users: model.max_users,
            monthly_ai_credits: model.monthly_ai_credits,
            current_period_end: model.current_period_end,
            updated_at: model.updated_at,
        }
    }
}

impl From<ProfileModel> for Profile {
    fn from(model: ProfileModel) -> Self {
        Profile {
            user_id: model.id,
            company_id: model.company_id,
            role: MemberRole::parse(&model.role),
            full_name: model.full_name,
        }
    }
}
