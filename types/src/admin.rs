use serde::{Deserialize, Serialize};

use crate::{ReportId, UserId, VerificationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Investigating,
    Resolved,
    Dismissed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportSeverity {
    Low,
    Medium,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    #[serde(default)]
    pub reporter_name: Option<String>,
    #[serde(default)]
    pub reported_user_name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub severity: ReportSeverity,
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub time_ago: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub id: VerificationId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub action: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudEvent {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: ReportSeverity,
    #[serde(default)]
    pub metadata: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Scans accepted by `POST /api/admin/fraud/scan/{kind}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudScan {
    Duplicates,
    Spam,
    Mismatches,
    All,
}

impl FraudScan {
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Duplicates => "duplicates",
            Self::Spam => "spam",
            Self::Mismatches => "mismatches",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletionRequest {
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_by_impact() {
        assert!(ReportSeverity::Critical > ReportSeverity::High);
        assert!(ReportSeverity::Low < ReportSeverity::Medium);
    }

    #[test]
    fn fraud_event_decodes_backend_dto() {
        let e: FraudEvent = serde_json::from_str(
            r#"{"id":1,"userId":4,"userName":"Unknown","type":"SPAM_MESSAGES","severity":"HIGH"}"#,
        )
        .unwrap();
        assert_eq!(e.kind, "SPAM_MESSAGES");
        assert_eq!(e.severity, ReportSeverity::High);
    }
}
