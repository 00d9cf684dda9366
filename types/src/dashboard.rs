//! Role-specific dashboard payloads. Chart series are kept as raw JSON.

use std::collections::HashMap;

use serde::Deserialize;

use crate::{BookingResponse, PropertyResponse, User};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetric {
    pub label: String,
    pub value: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub change: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub metrics: Vec<DashboardMetric>,
    #[serde(default)]
    pub total_users: Option<u64>,
    #[serde(default)]
    pub total_properties: Option<u64>,
    #[serde(default)]
    pub active_bookings: Option<u64>,
    #[serde(default)]
    pub pending_bookings: Option<u64>,
    #[serde(default)]
    pub completed_bookings: Option<u64>,
    #[serde(default)]
    pub profile_completion: Option<u32>,
    #[serde(default)]
    pub unread_messages_count: Option<u32>,
    #[serde(default)]
    pub upcoming_bookings: Option<u64>,
    #[serde(default)]
    pub recent_bookings: Vec<BookingResponse>,
    #[serde(default)]
    pub property_status_stats: HashMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_landlords: u64,
    #[serde(default)]
    pub total_listings: u64,
    #[serde(default)]
    pub verified_listings_count: u64,
    #[serde(default)]
    pub pending_verifications_count: u64,
    #[serde(default)]
    pub seat_occupancy_rate: f64,
    #[serde(default)]
    pub pending_verification_users: Vec<User>,
    #[serde(default)]
    pub today_audit_logs: u64,
    #[serde(default)]
    pub total_bookings: u64,
    #[serde(default)]
    pub confirmed_bookings: u64,
    #[serde(default)]
    pub cancelled_bookings: u64,
    #[serde(default)]
    pub banned_users_count: u64,
    #[serde(default)]
    pub occupancy_analytics: Vec<serde_json::Value>,
    #[serde(default)]
    pub property_growth_stats: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordDashboard {
    #[serde(default)]
    pub active_properties_count: u64,
    #[serde(default)]
    pub total_requests_pending: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub total_views: Option<u64>,
    #[serde(default)]
    pub total_inquiries: Option<u64>,
    #[serde(default)]
    pub occupancy_rate: f64,
    #[serde(default)]
    pub incoming_tenant_requests: Vec<BookingResponse>,
    #[serde(default)]
    pub my_properties_overview: Vec<PropertyResponse>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboard {
    #[serde(default)]
    pub compatibility_match_stats: f64,
    #[serde(default)]
    pub upcoming_visits_count: u64,
    #[serde(default)]
    pub unread_notifications_count: u64,
    #[serde(default)]
    pub recommended_rooms: Vec<PropertyResponse>,
    #[serde(default)]
    pub saved_items_count: u64,
    #[serde(default)]
    pub active_searches_count: u64,
    #[serde(default)]
    pub pending_visits_count: u64,
}

/// `GET /api/admin/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_house_owners: u64,
    #[serde(default)]
    pub total_regular_users: u64,
    #[serde(default)]
    pub total_admins: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub pending_verifications: u64,
}
