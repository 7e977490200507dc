//! Contact entity

use uuid::Uuid;

/// Contact entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: Uuid,
    pub company_id: Uuid,
    pub phone: String,
    pub name: Option<String>,
}

impl Contact {
    /// First word of the contact's name, if any
    pub fn first_name(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.split_whitespace().next())
    }
}
