//! Placeholder rendering for template follow-up steps

use super::Contact;

/// Render `{{name}}`, `{{first_name}}` and `{{phone}}` for a contact.
///
/// Whitespace inside the braces is ignored. Unknown placeholders are left as-is.
pub fn render_template(template: &str, contact: &Contact) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = after_open[..end].trim();
        match key {
            "name" | "nome" => out.push_str(contact.name.as_deref().unwrap_or("").trim()),
            "first_name" | "primeiro_nome" => out.push_str(contact.first_name().unwrap_or("")),
            "phone" | "telefone" => out.push_str(&contact.phone),
            _ => out.push_str(&rest[start..start + 2 + end + 2]),
        }

        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}
