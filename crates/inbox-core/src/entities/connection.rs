//! WhatsApp connection entity - one gateway instance owned by a company

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gateway session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Connecting,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnected => "disconnected",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "connected" | "open" => Self::Connected,
            "connecting" | "qrcode" => Self::Connecting,
            _ => Self::Disconnected,
        }
    }
}

/// WhatsApp connection entity
#[derive(Clone, PartialEq, Eq)]
pub struct WhatsAppConnection {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    /// Per-instance gateway token
    pub instance_token: String,
    pub status: ConnectionStatus,
}

impl WhatsAppConnection {
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

impl std::fmt::Debug for WhatsAppConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppConnection")
            .field("id", &self.id)
            .field("company_id", &self.company_id)
            .field("name", &self.name)
            .field("phone_number", &self.phone_number)
            .field("instance_token", &"[redacted]")
            .field("status", &self.status)
            .finish()
    }
}
