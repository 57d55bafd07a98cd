//! Session identity and lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a design session.
///
/// The gateway reports `in_progress` and `ready_to_finalize`; `finalized` is
/// set by the client once the final design has been received. Older service
/// versions spell the terminal state `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    ReadyToFinalize,
    #[serde(alias = "completed")]
    Finalized,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::InProgress => write!(f, "in_progress"),
            SessionStatus::ReadyToFinalize => write!(f, "ready_to_finalize"),
            SessionStatus::Finalized => write!(f, "finalized"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_progress" => Ok(SessionStatus::InProgress),
            "ready_to_finalize" => Ok(SessionStatus::ReadyToFinalize),
            "finalized" | "completed" => Ok(SessionStatus::Finalized),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::InProgress
    }
}

/// A live design session as seen by the client.
///
/// The id is opaque and issued by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl Session {
    /// Short prefix of the session id for display.
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }
}

/// First eight characters of an opaque id (fewer if the id is shorter).
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_roundtrip() {
        for status in [
            SessionStatus::InProgress,
            SessionStatus::ReadyToFinalize,
            SessionStatus::Finalized,
        ] {
            let s = status.to_string();
            let parsed: SessionStatus = s.parse().unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_session_status_serde() {
        let json = serde_json::to_string(&SessionStatus::ReadyToFinalize).unwrap();
        assert_eq!(json, "\"ready_to_finalize\"");
        let parsed: SessionStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, SessionStatus::Finalized);
    }

    #[test]
    fn test_session_status_default() {
        assert_eq!(SessionStatus::default(), SessionStatus::InProgress);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0f8fad5b-d9cb-469f-a165-70867728950e"), "0f8fad5b");
        assert_eq!(short_id("abc"), "abc");
    }
}
