//! StayMate backend client.
//!
//! # Architecture
//!
//! - [`ApiClient`]: request pipeline. Attaches the bearer token, retries
//!   transient failures ([`retry`]) and, on a 401, runs one shared token
//!   refresh for all concurrent callers before replaying the request once.
//! - [`api`]: typed wrappers per backend resource, reached through accessor
//!   methods such as [`ApiClient::messages`].
//! - [`Session`]: login/logout and the current user.
//! - [`Inbox`]: conversation list and open-conversation state fed by REST
//!   calls and real-time events.
//!
//! # Errors
//!
//! Every fallible call returns [`ClientError`]. A rejected or missing refresh
//! token surfaces as [`ClientError::SessionExpired`] and is also broadcast as
//! [`SessionEvent::Expired`].

pub mod api;
mod error;
mod http;
pub mod inbox;
mod refresh;
pub mod retry;
pub mod session;
pub mod tokens;

use std::sync::Arc;
use std::time::Duration;

pub use error::ClientError;
pub use http::{ApiClient, ApiRequest, SessionEvent};
pub use inbox::Inbox;
pub use session::Session;
pub use tokens::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};

pub use staymate_types as types;

use staymate_config::{StaymateConfig, TokenStoreKind};

pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

fn base_client_builder(connect_timeout: Duration) -> reqwest::ClientBuilder {
    use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    default_headers.insert(
        "X-Client-Platform",
        HeaderValue::from_static(std::env::consts::OS),
    );

    reqwest::Client::builder()
        .user_agent(concat!("staymate/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(connect_timeout)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

pub fn http_client(
    connect_timeout: Duration,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder(connect_timeout).timeout(timeout).build()
}

/// Read at most 32 KiB of an error body, with credentials redacted.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    let mut truncated = false;
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            truncated = true;
            break;
        }
    }
    let text = String::from_utf8_lossy(&body);
    let text = staymate_utils::redact_credentials(&text);
    if truncated {
        format!("{text}...(truncated)")
    } else {
        text.into_owned()
    }
}

/// Build the token store selected by `[auth]`.
///
/// A file store without a resolvable path falls back to memory.
#[must_use]
pub fn token_store_from_config(config: &StaymateConfig) -> Arc<dyn TokenStore> {
    match (config.auth.token_store, config.token_path()) {
        (TokenStoreKind::File, Some(path)) => Arc::new(FileTokenStore::new(path)),
        (TokenStoreKind::File, None) => {
            tracing::warn!("No home directory; credentials will not persist");
            Arc::new(MemoryTokenStore::new())
        }
        (TokenStoreKind::Memory, _) => Arc::new(MemoryTokenStore::new()),
    }
}

impl ApiClient {
    /// Client configured from `config.toml` settings.
    pub fn from_config(config: &StaymateConfig) -> Result<Self, ClientError> {
        let base_url = config
            .base_url()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        let http = http_client(config.connect_timeout(), config.request_timeout()).map_err(
            |source| ClientError::Transport {
                attempts: 0,
                source,
            },
        )?;
        Ok(Self::with_http(
            http,
            &base_url,
            token_store_from_config(config),
            config.retry.into(),
        ))
    }
}
