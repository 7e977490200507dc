//! Profile entity - links an auth user to a company

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::Permissions;

/// Role of a team member inside a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Agent,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Agent => "agent",
        }
    }

    /// Unknown roles degrade to `Agent`
    pub fn parse(value: &str) -> Self {
        match value {
            "owner" => Self::Owner,
            "admin" => Self::Admin,
            _ => Self::Agent,
        }
    }

    /// Permission set granted by this role
    pub fn permissions(self) -> Permissions {
        match self {
            Self::Owner | Self::Admin => Permissions::ALL,
            Self::Agent => Permissions::DEFAULT,
        }
    }
}

/// Profile entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: MemberRole,
    pub full_name: Option<String>,
}

impl Profile {
    #[inline]
    pub fn permissions(&self) -> Permissions {
        self.role.permissions()
    }
}
