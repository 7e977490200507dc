//! Connection, contact, conversation and agent model -> entity mappers

use inbox_core::entities::{
    AiAgent, ConnectionStatus, Contact, Conversation, ConversationStatus, WhatsAppConnection,
};

use crate::models::{AgentModel, ConnectionModel, ContactModel, ConversationModel};

impl From<ConnectionModel> for WhatsAppConnection {
    fn from(model: ConnectionModel) -> Self {
        WhatsAppConnection {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            phone_number: model.phone_number,
            instance_token: model.instance_token,
            status: ConnectionStatus::parse(&model.status),
        }
    }
}

impl From<ContactModel> for Contact {
    fn from(model: ContactModel) -> Self {
        Contact {
            id: model.id,
            company_id: model.company_id,
            phone: model.phone,
            name: model.name,
        }
    }
}

impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: model.id,
            company_id: model.company_id,
            connection_id: model.connection_id,
            contact_id: model.contact_id,
            status: ConversationStatus::parse(&model.status),
            last_message_at: model.last_message_at,
            last_inbound_at: model.last_inbound_at,
        }
    }
}

impl From<AgentModel> for AiAgent {
    fn from(model: AgentModel) -> Self {
        AiAgent {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            persona: model.persona,
            rules: model.rules,
            knowledge: model.knowledge,
            model: model.model,
            temperature: model.temperature,
        }
    }
}
