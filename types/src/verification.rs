//! Account verification: email, phone OTP and identity documents.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    #[default]
    NotUploaded,
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationStatus {
    pub email_verified: bool,
    pub phone_verified: bool,
    pub profile_complete: bool,
    pub document_status: DocumentStatus,
    pub rejection_reason: Option<String>,
}

impl VerificationStatus {
    #[must_use]
    pub fn is_fully_verified(&self) -> bool {
        self.email_verified
            && self.phone_verified
            && self.profile_complete
            && self.document_status == DocumentStatus::Approved
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneCodeRequest {
    pub phone_number: String,
}

/// Reply to a code request. Development backends echo the code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct PhoneCodeSent {
    pub otp: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhoneVerifyRequest {
    pub otp: String,
    pub phone: String,
}

/// `documentType` sent with an uploaded identity document.
pub const GOVERNMENT_ID: &str = "GOVERNMENT_ID";
