//! Wire payloads exchanged with the remote session gateway.
//!
//! Field names follow the service's JSON contract (`session_id`,
//! `next_questions`, ...). Every optional field tolerates being missing or
//! `null` so a partially populated record never fails a whole listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionStatus;
use crate::timestamp::{nullable_vec, optional_utc};

/// Body of the create-session request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub prompt: String,
}

/// Response to session creation. `questions` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub questions: Vec<String>,

    #[serde(default, deserialize_with = "optional_utc")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A question paired with the answer the user gave to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    pub answer: String,
}

/// Body of the reply request.
///
/// `Single` is the basic `{ "answer": ... }` form; `Paired` is the extended
/// `{ "answers": [{question, answer}] }` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyRequest {
    Single { answer: String },
    Paired { answers: Vec<AnsweredQuestion> },
}

/// Response to a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyResponse {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub next_questions: Vec<String>,

    pub status: SessionStatus,

    /// Free-form commentary from the service about the last answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

/// A persisted session as returned by the listing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub questions: Vec<String>,

    #[serde(default, deserialize_with = "optional_utc")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "nullable_vec")]
    pub conversation: Vec<StoredMessage>,
}

/// One conversation entry as stored by the service.
///
/// The role is free text here; it is normalized when the conversation is
/// reconstructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub diagram_url: Option<String>,
}
