//! Configuration for the StayMate client.
//!
//! Loaded from `~/.staymate/config.toml`. A missing file yields defaults that
//! point at a backend on `localhost:8080`. `${VAR}` references in string
//! values are expanded from the environment, and `STAYMATE_API_URL` /
//! `STAYMATE_WS_URL` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Raw WebSocket transport of the backend's SockJS endpoint.
pub const WS_PATH: &str = "/ws/websocket";

pub const API_URL_ENV: &str = "STAYMATE_API_URL";
pub const WS_URL_ENV: &str = "STAYMATE_WS_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid {field} URL {value:?}: {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaymateConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub retry: RetrySettings,
    pub realtime: RealtimeSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Derived from `base_url` when unset.
    pub ws_url: Option<String>,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ws_url: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_store: TokenStoreKind,
    /// Defaults to `~/.staymate/credentials.json`. A leading `~/` is expanded.
    pub token_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RealtimeSettings {
    pub reconnect_delay_ms: u64,
    pub heartbeat_incoming_ms: u64,
    pub heartbeat_outgoing_ms: u64,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 5_000,
            heartbeat_incoming_ms: 10_000,
            heartbeat_outgoing_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: Option<String>,
}

/// Replace `${VAR}` with the variable's value; unset variables become empty.
/// Unclosed `${` and empty names are left as written.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    expand_with(value, |name| env::var(name).ok())
}

fn expand_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(0) => {
                out.push_str("${}");
                rest = &after[1..];
            }
            Some(end) => {
                out.push_str(&lookup(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

impl StaymateConfig {
    /// Load the user's config file. Absent file means defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                let mut config = Self::default();
                config.apply_env_overrides(|k| env::var(k).ok());
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| {
                tracing::warn!(path = %path.display(), "Failed to read config: {source}");
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            Self::parse(&content).map_err(|source| {
                tracing::warn!(path = %path.display(), "Failed to parse config: {source}");
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?
        } else {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            Self::default()
        };
        config.expand_env();
        config.apply_env_overrides(|k| env::var(k).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn expand_env(&mut self) {
        self.api.base_url = expand_env_vars(&self.api.base_url);
        self.api.ws_url = self.api.ws_url.as_deref().map(expand_env_vars);
        self.auth.token_path = self.auth.token_path.as_deref().map(expand_env_vars);
        self.logging.level = self.logging.level.as_deref().map(expand_env_vars);
    }

    /// Apply `STAYMATE_API_URL` / `STAYMATE_WS_URL`. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(url) = lookup(WS_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.ws_url = Some(url.trim().to_string());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.ws_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_url("base_url", &self.api.base_url, &["http", "https"])
    }

    /// The configured WebSocket URL, or `base_url` with a ws scheme and the
    /// broker path.
    pub fn ws_url(&self) -> Result<Url, ConfigError> {
        if let Some(raw) = &self.api.ws_url {
            return parse_url("ws_url", raw, &["ws", "wss"]);
        }
        let base = self.base_url()?;
        let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
        let mut ws = base.clone();
        ws.set_scheme(scheme).map_err(|()| ConfigError::InvalidUrl {
            field: "ws_url",
            value: base.to_string(),
            reason: format!("cannot use scheme {scheme}"),
        })?;
        ws.set_path(WS_PATH);
        ws.set_query(None);
        Ok(ws)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs.max(1))
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.api.connect_timeout_secs.max(1))
    }

    /// Resolved credential file path, or `None` when no home directory exists
    /// and none is configured.
    #[must_use]
    pub fn token_path(&self) -> Option<PathBuf> {
        match self.auth.token_path.as_deref() {
            Some(raw) => Some(expand_home(raw)),
            None => staymate_dir().map(|d| d.join("credentials.json")),
        }
    }
}

fn parse_url(field: &'static str, raw: &str, schemes: &[&str]) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        field,
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !schemes.contains(&url.scheme()) {
        return Err(invalid(format!("scheme must be one of {}", schemes.join(", "))));
    }
    Ok(url)
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

/// `~/.staymate`, home of the config file, credentials and logs.
#[must_use]
pub fn staymate_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".staymate"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    staymate_dir().map(|dir| dir.join("config.toml"))
}

/// Persist `[api].base_url` into the config file at `path`.
///
/// Uses `toml_edit` so comments and formatting survive. Creates the file and
/// its directory when missing.
pub fn persist_base_url(path: &Path, base_url: &Url) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        restrict_dir(parent)?;
    }

    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    if !doc.contains_key("api") {
        doc["api"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["api"]["base_url"] = toml_edit::value(base_url.as_str().trim_end_matches('/'));

    staymate_utils::persist_secret_file(path, doc.to_string().as_bytes())
}

/// Tighten a directory we own to 0o700 if group or other can access it.
#[cfg(unix)]
fn restrict_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};

    let metadata = fs::metadata(dir)?;
    // SAFETY: getuid has no preconditions and cannot fail.
    let our_uid = unsafe { libc::getuid() };
    if metadata.uid() == our_uid && metadata.permissions().mode() & 0o077 != 0 {
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn expand_leaves_plain_text_alone() {
        assert_eq!(expand_with("hello world", lookup(&[])), "hello world");
    }

    #[test]
    fn expand_replaces_known_and_blanks_unknown() {
        let vars = lookup(&[("HOST", "api.example.com")]);
        assert_eq!(
            expand_with("https://${HOST}/${MISSING}x", vars),
            "https://api.example.com/x"
        );
    }

    #[test]
    fn expand_preserves_unclosed_and_empty_names() {
        assert_eq!(expand_with("a ${ b", lookup(&[])), "a ${ b");
        assert_eq!(expand_with("a ${} b", lookup(&[])), "a ${} b");
    }

    #[test]
    fn expand_handles_adjacent_and_unicode() {
        let vars = lookup(&[("A", "α"), ("B", "β")]);
        assert_eq!(expand_with("${A}${B}→", vars), "αβ→");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = StaymateConfig::parse("").unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.retry, RetrySettings::default());
        assert_eq!(config.realtime.reconnect_delay_ms, 5_000);
        assert_eq!(config.auth.token_store, TokenStoreKind::File);
        assert_eq!(config.ws_url().unwrap().as_str(), "ws://localhost:8080/ws/websocket");
    }

    #[test]
    fn parses_all_sections() {
        let config = StaymateConfig::parse(
            r#"
            [api]
            base_url = "https://staymate.example"
            timeout_secs = 5

            [auth]
            token_store = "memory"

            [retry]
            max_retries = 0

            [realtime]
            reconnect_delay_ms = 1000

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.auth.token_store, TokenStoreKind::Memory);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.initial_delay_ms, 500);
        assert_eq!(config.realtime.reconnect_delay_ms, 1000);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(
            config.ws_url().unwrap().as_str(),
            "wss://staymate.example/ws/websocket"
        );
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = StaymateConfig::default();
        config.apply_env_overrides(lookup(&[
            (API_URL_ENV, "https://prod.example"),
            (WS_URL_ENV, "wss://push.example/ws"),
        ]));
        assert_eq!(config.base_url().unwrap().as_str(), "https://prod.example/");
        assert_eq!(config.ws_url().unwrap().as_str(), "wss://push.example/ws");
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let mut config = StaymateConfig::default();
        config.apply_env_overrides(lookup(&[(API_URL_ENV, "  ")]));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn invalid_urls_are_rejected_with_field_name() {
        let mut config = StaymateConfig::default();
        config.api.base_url = "ftp://files.example".into();
        match config.validate() {
            Err(ConfigError::InvalidUrl { field, .. }) => assert_eq!(field, "base_url"),
            other => panic!("expected InvalidUrl, got {other:?}"),
        }

        let mut config = StaymateConfig::default();
        config.api.ws_url = Some("http://not-a-socket".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUrl { field: "ws_url", .. })
        ));
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = StaymateConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.retry, RetrySettings::default());
        assert_eq!(config.realtime, RealtimeSettings::default());
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\nbase_url = 1").unwrap();
        let err = StaymateConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn persist_base_url_keeps_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "# my settings\n[api]\nbase_url = \"http://old\" # old host\ntimeout_secs = 7\n",
        )
        .unwrap();

        persist_base_url(&path, &Url::parse("https://new.example/").unwrap()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("# my settings"));
        assert!(written.contains("base_url = \"https://new.example\""));
        assert!(written.contains("timeout_secs = 7"));
        let config = StaymateConfig::parse(&written).unwrap();
        assert_eq!(config.api.timeout_secs, 7);
    }

    #[test]
    fn persist_base_url_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        persist_base_url(&path, &Url::parse("http://localhost:9090").unwrap()).unwrap();
        let config = StaymateConfig::parse(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9090");
    }
}
