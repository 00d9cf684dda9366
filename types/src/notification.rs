use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{BookingId, ConversationId, NotificationId, PropertyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewMessage,
    BookingRequest,
    BookingConfirmed,
    BookingCancelled,
    BookingReminder,
    PropertyInquiry,
    PropertyApproved,
    PropertyRejected,
    PropertyViewed,
    ListingSaved,
    PriceDrop,
    ReviewReceived,
    ReviewReply,
    ProfileViewed,
    VerificationApproved,
    VerificationRequired,
    RoommateMatch,
    RoommateRequest,
    SystemAnnouncement,
    Welcome,
    AccountUpdate,
    SecurityAlert,
    PaymentReceived,
    PaymentFailed,
    PayoutSent,
    #[serde(other)]
    Unknown,
}

impl NotificationType {
    /// Bucket used by the summary counters.
    #[must_use]
    pub const fn category(self) -> NotificationCategory {
        match self {
            Self::NewMessage => NotificationCategory::Messages,
            Self::BookingRequest
            | Self::BookingConfirmed
            | Self::BookingCancelled
            | Self::BookingReminder => NotificationCategory::Bookings,
            Self::PropertyInquiry
            | Self::PropertyApproved
            | Self::PropertyRejected
            | Self::PropertyViewed
            | Self::ListingSaved
            | Self::PriceDrop => NotificationCategory::Property,
            _ => NotificationCategory::System,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCategory {
    Messages,
    Bookings,
    Property,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default)]
    pub type_display_name: Option<String>,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub read_at: Option<String>,
    #[serde(default)]
    pub action_url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_color: Option<String>,
    #[serde(default)]
    pub sender_id: Option<UserId>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sender_avatar: Option<String>,
    #[serde(default)]
    pub property_id: Option<PropertyId>,
    #[serde(default)]
    pub property_title: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    #[serde(default)]
    pub review_id: Option<i64>,
    pub created_at: String,
    #[serde(default)]
    pub time_ago: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    #[serde(default)]
    pub notifications: Vec<NotificationResponse>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationUnreadCountResponse {
    #[serde(default)]
    pub total_unread: u32,
    #[serde(default)]
    pub count_by_type: HashMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSummary {
    #[serde(default)]
    pub total_unread: u32,
    #[serde(default)]
    pub messages_unread: u32,
    #[serde(default)]
    pub bookings_unread: u32,
    #[serde(default)]
    pub property_unread: u32,
    #[serde(default)]
    pub system_unread: u32,
    #[serde(default)]
    pub recent_notifications: Vec<NotificationResponse>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationMarkAsReadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_ids: Option<Vec<NotificationId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_all: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDeleteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_ids: Option<Vec<NotificationId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_all: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_read_only: Option<bool>,
}

/// Server-side list filter for `GET /api/notifications`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationFilter {
    Unread,
    Read,
}

impl NotificationFilter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }
}
