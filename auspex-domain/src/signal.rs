//! Inbound Signal Events
//!
//! The raw message events the router consumes from the message stream.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A message received from a subscribed channel.
///
/// Carries the raw text (may be empty) plus a time-ordered id used to
/// correlate log lines for one signal across the pipeline.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Time-ordered signal id for log correlation
    pub id: Uuid,
    /// Channel the message arrived on
    pub channel_id: i64,
    /// Raw message text
    pub text: String,
    /// When the message was received by this process
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Create a message event stamped with a fresh id and receive time.
    pub fn new(channel_id: i64, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            channel_id,
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_message_carries_text_verbatim() {
        let msg = InboundMessage::new(-100, "Xi Jinping call ends");

        assert_eq!(msg.channel_id, -100);
        assert_eq!(msg.text, "Xi Jinping call ends");
    }

    #[test]
    fn test_inbound_message_ids_are_unique() {
        let a = InboundMessage::new(1, "");
        let b = InboundMessage::new(1, "");

        assert_ne!(a.id, b.id);
    }
}
