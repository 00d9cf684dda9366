//! Payloads pushed by the message broker.

use serde::{Deserialize, Serialize};

use crate::{ConversationId, UserId};

/// Lightweight message alert sent on `/user/queue/messages` when the full
/// message body is not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageNotification {
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub preview: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountUpdate {
    pub unread_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    pub user_id: UserId,
    pub online: bool,
    #[serde(default)]
    pub last_seen: Option<String>,
}
