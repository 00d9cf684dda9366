//! Bearer credentials issued by the backend.
//!
//! `Debug` is manually implemented on every type holding a token so that a
//! stray `{:?}` in a log line can never disclose a credential.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifetime the backend gives access tokens when `expiresIn` is absent.
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::minutes(15);
/// Lifetime of a refresh token.
pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::days(7);

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(<redacted>)")
    }
}

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RefreshToken(<redacted>)")
    }
}

impl RefreshToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

/// Access + refresh token pair with their local expiry instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh: RefreshToken,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl TokenPair {
    /// Build a pair issued at `now`.
    ///
    /// `expires_in_ms` is the backend's `expiresIn`. Non-positive values, and
    /// values that would overflow the expiry instant, fall back to
    /// [`DEFAULT_ACCESS_TOKEN_TTL`].
    #[must_use]
    pub fn issued_at(
        access: AccessToken,
        refresh: RefreshToken,
        expires_in_ms: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        let access_expires_at = expires_in_ms
            .filter(|ms| *ms > 0)
            .and_then(Duration::try_milliseconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(now + DEFAULT_ACCESS_TOKEN_TTL);
        Self {
            access,
            refresh,
            access_expires_at,
            refresh_expires_at: now + DEFAULT_REFRESH_TOKEN_TTL,
        }
    }

    #[must_use]
    pub fn access_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.access_expires_at
    }

    #[must_use]
    pub fn refresh_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.refresh_expires_at
    }
}
