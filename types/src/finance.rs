//! Earnings, payments and payouts.
//!
//! Monetary amounts arrive as JSON numbers (`BigDecimal` on the backend) and
//! are kept as `f64`; they are only ever displayed, never computed with.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{BookingId, PayoutMethodId, PayoutRequestId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EarningStatus {
    Pending,
    Available,
    Requested,
    Paid,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Approved,
    Completed,
    Paid,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl PayoutStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Approved => "APPROVED",
            Self::Completed => "COMPLETED",
            Self::Paid => "PAID",
            Self::Rejected => "REJECTED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::str::FromStr for PayoutStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PROCESSING" => Ok(Self::Processing),
            "APPROVED" => Ok(Self::Approved),
            "COMPLETED" => Ok(Self::Completed),
            "PAID" => Ok(Self::Paid),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("unknown payout status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
    #[serde(default)]
    pub total_earnings: f64,
    #[serde(default)]
    pub available_balance: f64,
    #[serde(default)]
    pub pending_balance: f64,
    #[serde(default)]
    pub total_commission: f64,
    #[serde(default)]
    pub total_paid_out: f64,
    #[serde(default)]
    pub recent_earnings: Vec<Earning>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earning {
    pub id: i64,
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    #[serde(default)]
    pub property_title: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub commission: f64,
    #[serde(default)]
    pub net_amount: f64,
    pub status: EarningStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    #[serde(default)]
    pub booking_id: Option<BookingId>,
    #[serde(default)]
    pub property_title: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub total_refunded: f64,
    #[serde(default)]
    pub payment_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutMethod {
    pub id: PayoutMethodId,
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Masked by the backend.
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub account_holder_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub verification_status: Option<String>,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutMethodRequest {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub is_default: bool,
}

impl std::fmt::Debug for PayoutMethodRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayoutMethodRequest")
            .field("bank_name", &self.bank_name)
            .field("account_number", &"<redacted>")
            .field("account_holder_name", &self.account_holder_name)
            .field("is_default", &self.is_default)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    pub id: PayoutRequestId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub amount: f64,
    pub status: PayoutStatus,
    #[serde(default)]
    pub admin_note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminFinancialSummary {
    #[serde(default)]
    pub total_platform_revenue: f64,
    #[serde(default)]
    pub total_platform_commission: f64,
    #[serde(default)]
    pub total_owner_earnings: f64,
    #[serde(default)]
    pub pending_payouts: f64,
    #[serde(default)]
    pub processing_payouts: f64,
    #[serde(default)]
    pub completed_payouts: f64,
    #[serde(default)]
    pub total_payout_requests: u64,
    #[serde(default)]
    pub pending_payout_count: u64,
}

/// Filters for `GET /api/finance/history`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EarningsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<EarningStatus>,
}

impl EarningsQuery {
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(d) = self.start_date {
            out.push(("startDate", d.to_string()));
        }
        if let Some(d) = self.end_date {
            out.push(("endDate", d.to_string()));
        }
        if let Some(status) = self.status
            && let Ok(serde_json::Value::String(s)) = serde_json::to_value(status)
        {
            out.push(("status", s));
        }
        out
    }
}
