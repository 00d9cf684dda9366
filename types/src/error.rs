use serde::{Deserialize, Serialize};

/// Error envelope returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl ApiErrorBody {
    /// The most specific human-readable description available.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or(self.error.as_deref())
    }
}

impl std::fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.summary(), &self.path) {
            (Some(s), Some(p)) => write!(f, "{s} ({p})"),
            (Some(s), None) => f.write_str(s),
            (None, Some(p)) => write!(f, "request to {p} failed"),
            (None, None) => f.write_str("request failed"),
        }
    }
}
