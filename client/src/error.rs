use reqwest::StatusCode;
use staymate_types::ApiErrorBody;
use thiserror::Error;

use crate::tokens::TokenStoreError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The refresh token is missing or was rejected; the stored credentials
    /// have been cleared.
    #[error("session expired; log in again")]
    SessionExpired,

    /// The request was still rejected with 401 after replaying it with fresh
    /// credentials.
    #[error("request unauthorized after refreshing credentials")]
    Unauthorized,

    /// The caller that was refreshing the session was cancelled before it
    /// produced an outcome. Stored credentials are untouched.
    #[error("token refresh was interrupted")]
    RefreshInterrupted,

    /// Non-2xx response other than a handled 401.
    #[error("{status}: {}", body.summary().unwrap_or(raw.as_str()))]
    Api {
        status: StatusCode,
        body: ApiErrorBody,
        /// Redacted, size-capped response text.
        raw: String,
    },

    #[error("request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl ClientError {
    /// HTTP status of an API error.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// True when the user has to log in again.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotAuthenticated | Self::Unauthorized)
    }
}
