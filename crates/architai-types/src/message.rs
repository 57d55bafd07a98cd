//! Conversation message types.
//!
//! A [`Message`] is one entry of a conversation log. The role is a closed
//! tagged variant: user and assistant messages carry text, a final-design
//! message carries the locator of the generated diagram.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message in a design conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageRole {
    User,
    Assistant,
    FinalDesign,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::FinalDesign => write!(f, "final-design"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    /// Parses the spellings the generation service has used over time.
    ///
    /// Matching is case-insensitive; `architai` is the service's own name for
    /// the assistant and `finalDesign` / `final_design` both map to
    /// [`MessageRole::FinalDesign`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" | "architai" => Ok(MessageRole::Assistant),
            "final-design" | "final_design" | "finaldesign" => Ok(MessageRole::FinalDesign),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single entry in a conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum Message {
    User {
        text: String,
    },
    Assistant {
        text: String,
    },
    FinalDesign {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        diagram_reference: Option<String>,
    },
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message::User { text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Message::Assistant { text: text.into() }
    }

    pub fn final_design(diagram_reference: Option<String>) -> Self {
        Message::FinalDesign { diagram_reference }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            Message::User { .. } => MessageRole::User,
            Message::Assistant { .. } => MessageRole::Assistant,
            Message::FinalDesign { .. } => MessageRole::FinalDesign,
        }
    }

    /// Text of a user or assistant message.
    pub fn text(&self) -> Option<&str> {
        match self {
            Message::User { text } | Message::Assistant { text } => Some(text),
            Message::FinalDesign { .. } => None,
        }
    }

    /// Diagram locator of a final-design message.
    pub fn diagram_reference(&self) -> Option<&str> {
        match self {
            Message::FinalDesign { diagram_reference } => diagram_reference.as_deref(),
            _ => None,
        }
    }

    pub fn is_final_design(&self) -> bool {
        matches!(self, Message::FinalDesign { .. })
    }
}
