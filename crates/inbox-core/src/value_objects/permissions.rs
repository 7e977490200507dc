//! Permission bitflags for team members
//!
//! Derived from the member's role; never stored per user.

use bitflags::bitflags;
use serde::{Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Team member permission flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u32 {
        /// Send messages from the inbox
        const SEND_MESSAGES      = 1 << 0;
        /// Create sequences and trigger the follow-up queue
        const MANAGE_FOLLOW_UPS  = 1 << 1;
        /// Pair and remove WhatsApp connections
        const MANAGE_CONNECTIONS = 1 << 2;
        /// Change plan and payment settings
        const MANAGE_BILLING     = 1 << 3;
        /// Bypass all permission checks
        const ADMINISTRATOR      = 1 << 4;

        /// Permissions every agent gets
        const DEFAULT = Self::SEND_MESSAGES.bits();

        /// All permissions (owners and admins)
        const ALL = Self::SEND_MESSAGES.bits()
            | Self::MANAGE_FOLLOW_UPS.bits()
            | Self::MANAGE_CONNECTIONS.bits()
            | Self::MANAGE_BILLING.bits()
            | Self::ADMINISTRATOR.bits();
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Names of the individual flags that are set
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.list().join("|"))
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.list())
    }
}
