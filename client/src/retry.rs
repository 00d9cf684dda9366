//! Transient-failure retry with exponential backoff.
//!
//! Retried: HTTP 408, 409, 429, any 5xx, and connect or timeout errors.
//! An `x-should-retry: true|false` response header overrides the status
//! rule. A 401 is never retried here because the refresh protocol owns it.
//!
//! All attempts of one logical request share an `Idempotency-Key`
//! (`staymate-<uuid>`); `X-Retry-Count` counts up from 0.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use staymate_config::RetrySettings;
use uuid::Uuid;

const RETRY_COUNT_HEADER: &str = "x-retry-count";
const IDEMPOTENCY_HEADER: &str = "idempotency-key";
/// Server hints at or above this are ignored in favour of backoff.
const MAX_SERVER_HINT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt; 2 means at most 3 requests.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Each delay is shortened by a random share up to this fraction.
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryConfig {
    fn from(settings: RetrySettings) -> Self {
        let initial_delay = Duration::from_millis(settings.initial_delay_ms);
        Self {
            max_retries: settings.max_retries,
            initial_delay,
            max_delay: Duration::from_millis(settings.max_delay_ms).max(initial_delay),
            jitter_factor: 0.25,
        }
    }
}

impl RetryConfig {
    /// Wait before retry `attempt` (0-based). A usable server hint wins over
    /// the computed backoff.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, headers: Option<&HeaderMap>) -> Duration {
        if let Some(hint) = headers.and_then(server_hint) {
            return hint;
        }
        let exponent = attempt.min(16) as i32;
        let backoff = (self.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent))
            .min(self.max_delay.as_secs_f64());
        let shave = rand::random::<f64>() * self.jitter_factor.clamp(0.0, 1.0);
        Duration::from_secs_f64(backoff * (1.0 - shave))
    }
}

/// `Retry-After-Ms` (fractional milliseconds) first, then `Retry-After`
/// (whole seconds). Zero and anything at or past a minute are dropped.
#[must_use]
pub fn server_hint(headers: &HeaderMap) -> Option<Duration> {
    let text = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim);

    let from_ms = text("retry-after-ms")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| Duration::from_secs_f64(ms / 1000.0));
    let from_secs = || {
        text("retry-after")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
    };

    from_ms
        .filter(|d| *d < MAX_SERVER_HINT)
        .or_else(|| from_secs().filter(|d| !d.is_zero() && *d < MAX_SERVER_HINT))
}

#[must_use]
pub fn is_retryable_status(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::UNAUTHORIZED {
        return false;
    }
    let server_says = headers
        .get("x-should-retry")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| match s.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        });
    server_says.unwrap_or(matches!(status.as_u16(), 408 | 409 | 429 | 500..=599))
}

fn is_retryable_transport(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Transport failure after the last permitted attempt.
#[derive(Debug)]
pub struct TransportFailure {
    pub attempts: u32,
    pub source: reqwest::Error,
}

/// Send a request, retrying transient failures.
///
/// `build` is called once per attempt. Any HTTP response, success or not,
/// comes back as `Ok` once retrying stops.
pub async fn send_with_retry<F>(build: F, config: &RetryConfig) -> Result<Response, TransportFailure>
where
    F: Fn() -> RequestBuilder,
{
    let key = format!("staymate-{}", Uuid::new_v4());
    let key = HeaderValue::from_str(&key).ok();
    let mut attempt = 0;

    loop {
        let mut request = build().header(RETRY_COUNT_HEADER, attempt);
        if let Some(key) = &key {
            request = request.header(IDEMPOTENCY_HEADER, key.clone());
        }
        let last_try = attempt >= config.max_retries;

        let delay = match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() || last_try || !is_retryable_status(status, response.headers()) {
                    return Ok(response);
                }
                let delay = config.delay_for(attempt, Some(response.headers()));
                tracing::debug!(%status, attempt, delay_ms = delay.as_millis(), "Retrying after error status");
                delay
            }
            Err(source) => {
                if last_try || !is_retryable_transport(&source) {
                    return Err(TransportFailure {
                        attempts: attempt + 1,
                        source,
                    });
                }
                let delay = config.delay_for(attempt, None);
                tracing::debug!(error = %source, attempt, delay_ms = delay.as_millis(), "Retrying after transport error");
                delay
            }
        };

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
