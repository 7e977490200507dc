//! Phone number normalisation for WhatsApp recipients

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

const MIN_DIGITS: usize = 10;
const MAX_DIGITS: usize = 15;
const JID_SUFFIXES: [&str; 2] = ["@s.whatsapp.net", "@c.us"];

/// Digits-only phone number as the gateway expects it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalise a stored phone or WhatsApp JID
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let mut value = raw.trim();
        for suffix in JID_SUFFIXES {
            if let Some(stripped) = value.strip_suffix(suffix) {
                value = stripped;
            }
        }

        let mut digits = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '0'..='9' => digits.push(c),
                '+' | ' ' | '-' | '(' | ')' | '.' => {}
                _ => {
                    return Err(DomainError::ValidationError(format!(
                        "invalid character in phone number: {c:?}"
                    )))
                }
            }
        }

        if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
            return Err(DomainError::ValidationError(format!(
                "phone number must have between {MIN_DIGITS} and {MAX_DIGITS} digits"
            )));
        }

        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
