//! PostgreSQL implementations of CompanyRepository and ProfileRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use inbox_core::entities::{Company, Profile};
use inbox_core::error::DomainError;
use inbox_core::traits::{CompanyRepository, ProfileRepository, RepoResult};

use crate::models::{CompanyModel, ProfileModel};

use super::error::map_db_error;

const COMPANY_COLUMNS: &str = r#"
    id, name, plan, subscription_status, stripe_customer_id, stripe_subscription_id,
    max_connections, max_users, monthly_ai_credits, current_period_end, updated_at
"#;

/// PostgreSQL implementation of CompanyRepository
#[derive(Clone)]
pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Company>> {
        let result = sqlx::query_as::<_, CompanyModel>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Company::from))
    }

    #[instrument(skip(self))]
    async fn find_by_stripe_customer(&self, customer_id: &str) -> RepoResult<Option<Company>> {
        let result = sqlx::query_as::<_, CompanyModel>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE stripe_customer_id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Company::from))
    }

    #[instrument(skip(self, company), fields(company_id = %company.id))]
    async fn update_billing(&self, company: &Company) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET plan = $2,
                subscription_status = $3,
                stripe_customer_id = $4,
                stripe_subscription_id = $5,
                max_connections = $6,
                max_users = $7,
                monthly_ai_credits = $8,
                current_period_end = $9,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(company.id)
        .bind(&company.plan)
        .bind(company.subscription_status.as_str())
        .bind(&company.stripe_customer_id)
        .bind(&company.stripe_subscription_id)
        .bind(company.max_connections)
        .bind(company.max_users)
        .bind(company.monthly_ai_credits)
        .bind(company.current_period_end)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CompanyNotFound(company.id));
        }

        Ok(())
    }
}

/// PostgreSQL implementation of ProfileRepository
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        let result = sqlx::query_as::<_, ProfileModel>(
            r#"
            SELECT id, company_id, role, full_name
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Profile::from))
    }
}
