//! Prompt flattening.
//!
//! The cache key is never the raw request bytes; it is the flattened prompt
//! text, which two structurally-identical message sequences always produce
//! byte-for-byte (see [`flatten_prompt`]).

use serde::{Deserialize, Serialize};

/// A single chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" | "developer" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(()),
        }
    }
}

/// One message in a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Joins `"<role>: <content>"` lines in order.
///
/// Canonical: any two prompts that flatten to the same text MUST produce the
/// same cache decision, so this function must not depend on anything beyond
/// `messages` itself (no timestamps, no request ids).
pub fn flatten_prompt(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_in_order() {
        let messages = vec![
            Message::new(Role::System, "You are terse."),
            Message::new(Role::User, "Write a haiku about the sunset."),
        ];
        assert_eq!(
            flatten_prompt(&messages),
            "system: You are terse.\nuser: Write a haiku about the sunset."
        );
    }

    #[test]
    fn identical_sequences_flatten_identically() {
        let a = vec![Message::new(Role::User, "hi")];
        let b = vec![Message::new(Role::User, "hi")];
        assert_eq!(flatten_prompt(&a), flatten_prompt(&b));
    }

    #[test]
    fn empty_messages_flatten_to_empty_string() {
        assert_eq!(flatten_prompt(&[]), "");
    }
}
