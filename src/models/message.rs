use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message as seen by the client-side fetch pipeline. The same logical
/// message can arrive from the offline write queue, the realtime feed, and
/// the paged history fetch, so instances are view-model records rebuilt on
/// every fetch cycle, never a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server ids are UUID strings, but optimistic sends carry a
    /// client-generated placeholder id until the server echo arrives,
    /// so this stays an opaque string rather than a `Uuid`.
    pub id: String,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    /// RFC 3339 timestamp exactly as delivered by the backend.
    pub created_at: String,
    /// Client token attached when the message was queued offline; lets the
    /// server-confirmed copy be matched back to the optimistic one.
    pub idempotency_key: Option<String>,
}

impl Message {
    /// Parsed creation instant. `None` when the backend handed us a
    /// timestamp chrono cannot parse; such records still take part in
    /// id- and key-based comparison, they just never match on time.
    pub fn created_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Idempotency key usable for matching: present and non-empty.
    pub fn usable_idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref().filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Message {
        Message {
            id: "9f2c1e9a-8b9d-4f55-9a3e-2d1f0c6b7a88".into(),
            conversation_id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            content: "hello".into(),
            created_at: "2025-03-01T12:00:00.500Z".into(),
            idempotency_key: Some("send-1".into()),
        }
    }

    #[test]
    fn parses_rfc3339_created_at() {
        let msg = sample();
        let instant = msg.created_instant().expect("timestamp should parse");
        assert_eq!(instant.timestamp(), 1740830400);
        assert_eq!(instant.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn invalid_created_at_yields_none() {
        let mut msg = sample();
        msg.created_at = "not-a-timestamp".into();
        assert!(msg.created_instant().is_none());
    }

    #[test]
    fn empty_idempotency_key_is_unusable() {
        let mut msg = sample();
        assert_eq!(msg.usable_idempotency_key(), Some("send-1"));
        msg.idempotency_key = Some(String::new());
        assert_eq!(msg.usable_idempotency_key(), None);
        msg.idempotency_key = None;
        assert_eq!(msg.usable_idempotency_key(), None);
    }

    #[test]
    fn round_trips_through_json() {
        let msg = sample();
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
