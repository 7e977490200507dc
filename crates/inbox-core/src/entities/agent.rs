//! AI agent entity - persona used to write automated messages

use uuid::Uuid;

/// AI agent configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AiAgent {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub persona: Option<String>,
    pub rules: Option<String>,
    pub knowledge: Option<String>,
    /// Model override; the configured default is used when `None`
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl AiAgent {
    /// System instruction assembled from persona, rules and knowledge base
    pub fn system_instruction(&self) -> String {
        let mut sections = vec![format!("Você é {}.", self.name)];

        if let Some(persona) = non_blank(self.persona.as_deref()) {
            sections.push(format!("## Persona\n{persona}"));
        }
        if let Some(rules) = non_blank(self.rules.as_deref()) {
            sections.push(format!("## Regras\n{rules}"));
        }
        if let Some(knowledge) = non_blank(self.knowledge.as_deref()) {
            sections.push(format!("## Base de conhecimento\n{knowledge}"));
        }

        sections.join("\n\n")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
