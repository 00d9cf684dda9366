//! Wire types for the StayMate backend.
//!
//! This crate contains serde DTOs and small domain helpers with no IO and no
//! async. Everything here can be used from any layer of the client.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod admin;
mod application;
mod auth;
mod booking;
mod credentials;
mod dashboard;
mod error;
mod finance;
mod ids;
mod messaging;
mod notification;
mod page;
mod property;
mod realtime;
mod roommate;
mod verification;

pub use admin::{
    AuditLogEntry, DeletionRequest, FraudEvent, FraudScan, Report, ReportSeverity, ReportStatus,
    VerificationRequest,
};
pub use application::{
    ApplicationRequest, ApplicationResponse, ApplicationStatus,
};
pub use auth::{
    AccountStatus, AuthProvider, AuthResponse, AuthUser, EmailAvailability, HasRoleResponse,
    LoginRequest, MessageAck, PublicProfile, RegisterRequest, Role, RoleSelectionRequest,
    SelectableRole, TokenRefreshRequest, TokenValidation, UpdateProfileRequest, User,
    role_display_name,
};
pub use booking::{BookingRequest, BookingResponse, BookingStatus};
pub use credentials::{
    AccessToken, DEFAULT_ACCESS_TOKEN_TTL, DEFAULT_REFRESH_TOKEN_TTL, RefreshToken, TokenPair,
};
pub use dashboard::{
    AdminDashboard, AdminStats, DashboardMetric, DashboardStats, LandlordDashboard, UserDashboard,
};
pub use error::ApiErrorBody;
pub use finance::{
    AdminFinancialSummary, Earning, EarningStatus, EarningsQuery, EarningsSummary, Payment,
    PayoutMethod, PayoutMethodRequest, PayoutRequest, PayoutStatus, SpendingSummary,
};
pub use ids::{
    AmenityId, ApplicationId, BookingId, ConversationId, MessageId, NotificationId,
    PayoutMethodId, PayoutRequestId, PropertyId, ReportId, RoommatePostId, UserId,
    VerificationId,
};
pub use messaging::{
    ConversationListResponse, ConversationResponse, CreateConversationRequest, MarkAsReadRequest,
    MessageListResponse, MessageResponse, MessageType, SendMessageRequest, UnreadCountResponse,
};
pub use notification::{
    NotificationCategory, NotificationDeleteRequest, NotificationFilter,
    NotificationListResponse, NotificationMarkAsReadRequest, NotificationResponse,
    NotificationSummary, NotificationType, NotificationUnreadCountResponse,
};
pub use page::{Page, PageRequest};
pub use property::{
    Amenity, AvailabilityCheck, PropertyRequest, PropertyResponse, PropertySearch, PropertyStatus,
};
pub use realtime::{NewMessageNotification, PresenceUpdate, UnreadCountUpdate};
pub use roommate::{RoommatePost, RoommatePostStatus, RoommateSearch};
pub use verification::{
    DocumentStatus, GOVERNMENT_ID, PhoneCodeRequest, PhoneCodeSent, PhoneVerifyRequest,
    VerificationStatus,
};
