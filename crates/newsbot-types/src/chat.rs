//! Session and turn types for newsbot conversations.
//!
//! A session has no record of its own: it exists while at least one
//! non-expired [`Turn`] is stored under its [`SessionId`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::InvalidSessionId;

use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a conversation session.
///
/// Clients generate these; the transport layer only accepts well-formed
/// UUID strings, so every `SessionId` in the system wraps a valid UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a fresh random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Length of the hyphenated `8-4-4-4-12` form.
const HYPHENATED_LEN: usize = 36;

impl FromStr for SessionId {
    type Err = InvalidSessionId;

    /// Accepts only the hyphenated form; simple, braced and `urn:uuid:`
    /// spellings are rejected. Hex digits read back in lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HYPHENATED_LEN {
            return Err(InvalidSessionId(s.to_string()));
        }
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| InvalidSessionId(s.to_string()))
    }
}

/// One user/bot exchange, the atomic unit of conversation history.
///
/// Serialized as `{"user": ..., "bot": ..., "timestamp": "<ISO-8601>"}`,
/// which is also the persisted representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// The user's original message.
    pub user: String,
    /// The generated answer, or the fallback reply when retrieval found nothing.
    pub bot: String,
    /// When the exchange was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
            timestamp,
        }
    }
}

/// A session together with its full history, oldest turn first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistory {
    pub session_id: SessionId,
    pub history: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_id_roundtrip() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_session_id_rejects_non_uuid() {
        assert!("not-a-session".parse::<SessionId>().is_err());
        assert!("".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_session_id_rejects_non_hyphenated_spellings() {
        for raw in [
            "6f1c2b1e8d4a4c599a572f0f8c7d9b10",
            "{6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10}",
            "urn:uuid:6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10",
            " 6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10",
            "6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b1g",
        ] {
            assert!(raw.parse::<SessionId>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_session_id_keeps_client_spelling() {
        let raw = "6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10";
        assert_eq!(raw.parse::<SessionId>().unwrap().to_string(), raw);
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let id: SessionId = "6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6f1c2b1e-8d4a-4c59-9a57-2f0f8c7d9b10\"");
    }

    #[test]
    fn test_turn_wire_format() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let turn = Turn::new("What happened?", "Nothing much.", ts);
        let value = serde_json::to_value(&turn).unwrap();

        assert_eq!(value["user"], "What happened?");
        assert_eq!(value["bot"], "Nothing much.");
        assert_eq!(value["timestamp"], "2024-05-01T12:30:00Z");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_turn_accepts_millisecond_timestamps() {
        // Histories written by JavaScript clients use `toISOString()`.
        let json = r#"{"user":"hi","bot":"hello","timestamp":"2024-05-01T12:30:00.123Z"}"#;
        let turn: Turn = serde_json::from_str(json).unwrap();
        assert_eq!(turn.timestamp.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_session_history_uses_camel_case() {
        let history = SessionHistory {
            session_id: SessionId::new(),
            history: Vec::new(),
        };
        let value = serde_json::to_value(&history).unwrap();
        assert!(value.get("sessionId").is_some());
        assert!(value["history"].as_array().unwrap().is_empty());
    }
}
