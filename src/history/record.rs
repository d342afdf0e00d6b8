//! Conversation record types

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Speaker of a conversation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// One message of a conversation, as stored on disk and sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub role: Role,
    pub content: String,
}

impl ConversationRecord {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Interpret a raw stored entry.
    ///
    /// Returns `None` unless the entry is an object with a recognized `role`
    /// and a string `content`. Extra keys are ignored.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        let object = entry.as_object()?;
        let role = Role::parse(object.get("role")?.as_str()?)?;
        let content = object.get("content")?.as_str()?;
        Some(Self::new(role, content))
    }

    pub fn to_entry(&self) -> Value {
        json!({
            "role": self.role.as_str(),
            "content": self.content,
        })
    }
}
