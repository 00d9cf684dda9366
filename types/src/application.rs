//! Rental applications sent between tenants and owners.

use serde::{Deserialize, Serialize};

use crate::{ApplicationId, PropertyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    /// Some backend builds spell this `APPROVED`.
    #[serde(alias = "APPROVED")]
    Accepted,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl ApplicationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "ACCEPTED" | "APPROVED" => Ok(Self::Accepted),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown application status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: ApplicationId,
    pub sender_id: UserId,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub sender_email: Option<String>,
    #[serde(default, alias = "senderProfilePicture")]
    pub sender_profile_picture_url: Option<String>,
    #[serde(default)]
    pub receiver_id: Option<UserId>,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub property_id: Option<PropertyId>,
    #[serde(default)]
    pub property_title: Option<String>,
    #[serde(default)]
    pub property_location: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    pub property_id: PropertyId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
