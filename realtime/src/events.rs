//! Broker destinations and the events decoded from them.

use staymate_types::{
    MessageResponse, NewMessageNotification, NotificationResponse, PresenceUpdate,
    UnreadCountUpdate,
};

pub const MESSAGES_QUEUE: &str = "/user/queue/messages";
pub const NOTIFICATIONS_QUEUE: &str = "/user/queue/notifications";
pub const UNREAD_COUNT_QUEUE: &str = "/user/queue/unread-count";
pub const PRESENCE_TOPIC: &str = "/topic/presence";

/// Subscribed after every `CONNECTED`, in this order.
pub const SUBSCRIPTIONS: [&str; 4] = [
    MESSAGES_QUEUE,
    NOTIFICATIONS_QUEUE,
    UNREAD_COUNT_QUEUE,
    PRESENCE_TOPIC,
];

#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Connected,
    Disconnected,
    Message(MessageResponse),
    /// Message alert without the full message.
    NewMessage(NewMessageNotification),
    Notification(NotificationResponse),
    UnreadCount(UnreadCountUpdate),
    Presence(PresenceUpdate),
    /// Broker `ERROR` frame or a failed connect.
    Error(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no handler for destination {0}")]
    UnknownDestination(String),
    #[error("invalid payload on {destination}: {source}")]
    Payload {
        destination: String,
        source: serde_json::Error,
    },
}

/// Decode a `MESSAGE` body delivered on `destination`.
///
/// The messages queue carries either a full message or a bare alert; the
/// full shape is tried first.
pub fn decode_event(destination: &str, body: &str) -> Result<RealtimeEvent, DecodeError> {
    let payload = |source| DecodeError::Payload {
        destination: destination.to_string(),
        source,
    };
    match destination {
        MESSAGES_QUEUE => match serde_json::from_str::<MessageResponse>(body) {
            Ok(message) => Ok(RealtimeEvent::Message(message)),
            Err(_) => serde_json::from_str(body)
                .map(RealtimeEvent::NewMessage)
                .map_err(payload),
        },
        NOTIFICATIONS_QUEUE => serde_json::from_str(body)
            .map(RealtimeEvent::Notification)
            .map_err(payload),
        UNREAD_COUNT_QUEUE => serde_json::from_str(body)
            .map(RealtimeEvent::UnreadCount)
            .map_err(payload),
        PRESENCE_TOPIC => serde_json::from_str(body)
            .map(RealtimeEvent::Presence)
            .map_err(payload),
        other => Err(DecodeError::UnknownDestination(other.to_string())),
    }
}
