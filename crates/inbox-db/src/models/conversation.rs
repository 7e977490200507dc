//! Conversation-side database models: connections, contacts, conversations, agents

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for whatsapp_connections table
#[derive(Debug, Clone, FromRow)]
pub struct ConnectionModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub instance_token: String,
    pub status: String,
}

/// Database model for contacts table
#[derive(Debug, Clone, FromRow)]
pub struct ContactModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub phone: String,
    pub name: Option<String>,
}

/// Database model for conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub connection_id: Uuid,
    pub contact_id: Uuid,
    pub status: String,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_inbound_at: Option<DateTime<Utc>>,
}

/// Database model for ai_agents table
#[derive(Debug, Clone, FromRow)]
pub struct AgentModel {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub persona: Option<String>,
    pub rules: Option<String>,
    pub knowledge: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}
