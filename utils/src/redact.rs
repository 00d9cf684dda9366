//! Credential redaction for text that may reach logs or the terminal.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

const REDACTED: &str = "[REDACTED]";

static BEARER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(bearer)\s+[A-Za-z0-9\-._~+/]+=*").expect("valid bearer regex")
});

static JWT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\beyJ[A-Za-z0-9_-]{4,}\.[A-Za-z0-9_-]{4,}\.[A-Za-z0-9_-]+").expect("valid JWT regex")
});

static TOKEN_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)("(?:access|refresh)_?token"\s*:\s*")[^"]*(")"#)
        .expect("valid token field regex")
});

/// Replace bearer credentials, JWT-shaped strings and `accessToken` /
/// `refreshToken` JSON values with `[REDACTED]`.
#[must_use]
pub fn redact_credentials(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    if TOKEN_FIELD.is_match(&out) {
        out = Cow::Owned(TOKEN_FIELD.replace_all(&out, format!("${{1}}{REDACTED}${{2}}")).into_owned());
    }
    if BEARER.is_match(&out) {
        out = Cow::Owned(BEARER.replace_all(&out, format!("$1 {REDACTED}")).into_owned());
    }
    if JWT.is_match(&out) {
        out = Cow::Owned(JWT.replace_all(&out, REDACTED).into_owned());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_borrowed() {
        assert!(matches!(redact_credentials("no secrets here"), Cow::Borrowed(_)));
    }

    #[test]
    fn bearer_values_are_redacted() {
        let out = redact_credentials("Authorization: Bearer abc.def-123");
        assert_eq!(out, "Authorization: Bearer [REDACTED]");
    }

    #[test]
    fn bare_jwts_are_redacted() {
        let out = redact_credentials("token eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxIn0.sig_part expired");
        assert_eq!(out, "token [REDACTED] expired");
    }

    #[test]
    fn token_json_fields_are_redacted() {
        let out = redact_credentials(r#"{"accessToken":"opaque","refreshToken":"r1","x":1}"#);
        assert_eq!(out, r#"{"accessToken":"[REDACTED]","refreshToken":"[REDACTED]","x":1}"#);
    }
}
