//! Permission service
//!
//! Resolves who is calling and what they may do. Users act inside their
//! profile's company with the permissions of their role; the service-role
//! key acts for every company.

use inbox_common::Claims;
use inbox_core::{DomainError, Permissions};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authenticated principal behind a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Trusted backend key (cron jobs, edge functions)
    ServiceRole,
    /// Signed-in Supabase user
    User(Uuid),
}

impl Caller {
    /// Map validated token claims to a caller
    pub fn from_claims(claims: &Claims) -> ServiceResult<Self> {
        if claims.is_service_role() {
            return Ok(Self::ServiceRole);
        }
        Ok(Self::User(claims.user_id()?))
    }
}

/// A caller with resolved company scope and permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// `None` for the service role
    pub user_id: Option<Uuid>,
    /// `None` when the actor is not scoped to one company
    pub company_id: Option<Uuid>,
    pub permissions: Permissions,
}

impl Actor {
    /// Whether the actor may touch rows of `company_id`
    #[inline]
    pub fn can_access_company(&self, company_id: Uuid) -> bool {
        self.company_id.map_or(true, |own| own == company_id)
    }
}

/// Permission service for access control
pub struct PermissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PermissionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Resolve the caller's company and permissions
    #[instrument(skip(self))]
    pub async fn resolve(&self, caller: Caller) -> ServiceResult<Actor> {
        match caller {
            Caller::ServiceRole => Ok(Actor {
                user_id: None,
                company_id: None,
                permissions: Permissions::ALL,
            }),
            Caller::User(user_id) => {
                let profile = self
                    .ctx
                    .profile_repo()
                    .find_by_user(user_id)
                    .await?
                    .ok_or_else(|| ServiceError::forbidden("caller has no profile"))?;

                debug!(company_id = %profile.company_id, role = profile.role.as_str(), "Caller resolved");

                Ok(Actor {
                    user_id: Some(user_id),
                    company_id: Some(profile.company_id),
                    permissions: profile.permissions(),
                })
            }
        }
    }

    /// Resolve the caller and require a permission
    #[instrument(skip(self))]
    pub async fn require(&self, caller: Caller, permission: Permissions) -> ServiceResult<Actor> {
        let actor = self.resolve(caller).await?;
        if !actor.permissions.has(permission) {
            return Err(DomainError::MissingPermission(permission.to_string()).into());
        }
        Ok(actor)
    }
}
