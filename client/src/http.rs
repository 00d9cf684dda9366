//! Authenticated request pipeline.

use std::sync::Arc;

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use staymate_types::{
    AccessToken, ApiErrorBody, AuthResponse, RefreshToken, TokenPair, TokenRefreshRequest,
};
use tokio::sync::broadcast;
use url::Url;

use crate::error::ClientError;
use crate::refresh::{RefreshCoordinator, RefreshFailure};
use crate::retry::{RetryConfig, TransportFailure, send_with_retry};
use crate::tokens::TokenStore;
use crate::{http_client, read_capped_error_body};

pub(crate) const REFRESH_PATH: &str = "/api/auth/refresh-token";

/// Paths whose 401 means "bad credentials" rather than "stale token".
const NO_REFRESH_PATHS: &[&str] = &["/api/auth/login", "/api/auth/register", REFRESH_PATH];

const EVENT_CAPACITY: usize = 32;

/// Authentication state changes, broadcast to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    Refreshed,
    /// Refresh failed or no refresh token exists; credentials were cleared.
    Expired,
}

#[derive(Debug, Clone)]
enum Body {
    Json(serde_json::Value),
    /// Multipart form with a single JSON part, as the property endpoints
    /// expect.
    JsonPart { name: String, json: String },
    /// Multipart form with one file part plus plain text fields.
    File {
        field: String,
        file_name: String,
        bytes: Vec<u8>,
        text: Vec<(String, String)>,
    },
}

/// A replayable request description.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Body>,
    skip_refresh: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let skip_refresh = NO_REFRESH_PATHS.contains(&path.as_str());
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
            skip_refresh,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn query_pairs<K: Into<String>>(
        mut self,
        pairs: impl IntoIterator<Item = (K, String)>,
    ) -> Self {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ClientError> {
        self.body = Some(Body::Json(
            serde_json::to_value(body).map_err(ClientError::Encode)?,
        ));
        Ok(self)
    }

    /// Send `body` as the JSON part `name` of a multipart form.
    pub fn json_part(
        mut self,
        name: impl Into<String>,
        body: &impl Serialize,
    ) -> Result<Self, ClientError> {
        self.body = Some(Body::JsonPart {
            name: name.into(),
            json: serde_json::to_string(body).map_err(ClientError::Encode)?,
        });
        Ok(self)
    }

    /// Upload `bytes` as the file part `field`, alongside `text` fields.
    #[must_use]
    pub fn file_part(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        text: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.body = Some(Body::File {
            field: field.into(),
            file_name: file_name.into(),
            bytes,
            text: text.into_iter().collect(),
        });
        self
    }

    /// A 401 on this request is returned as-is instead of refreshing.
    #[must_use]
    pub fn without_refresh(mut self) -> Self {
        self.skip_refresh = true;
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    /// Without trailing slash; request paths start with `/`.
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    retry: RetryConfig,
    refresh: RefreshCoordinator,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for dyn TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenStore")
    }
}

/// Cheaply cloneable handle; clones share tokens, refresh state and events.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Client with default HTTP settings.
    pub fn new(base_url: &Url, tokens: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let http = http_client(
            crate::DEFAULT_CONNECT_TIMEOUT,
            crate::DEFAULT_REQUEST_TIMEOUT,
        )
        .map_err(|source| ClientError::Transport {
            attempts: 0,
            source,
        })?;
        Ok(Self::with_http(http, base_url, tokens, RetryConfig::default()))
    }

    #[must_use]
    pub fn with_http(
        http: reqwest::Client,
        base_url: &Url,
        tokens: Arc<dyn TokenStore>,
        retry: RetryConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                tokens,
                retry,
                refresh: RefreshCoordinator::default(),
                events,
            }),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Stored credentials, ignoring a pair whose refresh token has expired.
    #[must_use]
    pub fn token_pair(&self) -> Option<TokenPair> {
        self.inner
            .tokens
            .load()
            .filter(|pair| !pair.refresh_expired_at(Utc::now()))
    }

    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.token_pair().map(|pair| pair.access)
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.token_pair().is_some()
    }

    /// Store the tokens from a login/register/refresh response.
    ///
    /// An empty `refreshToken` keeps the previously stored one.
    pub fn store_auth(&self, auth: &AuthResponse) -> Result<TokenPair, ClientError> {
        if auth.access_token.is_empty() {
            return Err(ClientError::InvalidRequest(
                "auth response carried no access token".into(),
            ));
        }
        let refresh = if auth.refresh_token.is_empty() {
            self.inner
                .tokens
                .load()
                .map(|pair| pair.refresh)
                .ok_or_else(|| {
                    ClientError::InvalidRequest("auth response carried no refresh token".into())
                })?
        } else {
            RefreshToken::new(auth.refresh_token.clone())
        };
        let pair = TokenPair::issued_at(
            AccessToken::new(auth.access_token.clone()),
            refresh,
            auth.expires_in,
            Utc::now(),
        );
        self.inner.tokens.save(&pair)?;
        Ok(pair)
    }

    pub fn clear_tokens(&self) -> Result<(), ClientError> {
        self.inner.tokens.clear()?;
        Ok(())
    }

    pub async fn send_json<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ClientError> {
        let path = req.path.clone();
        let bytes = self.execute(req).await?.bytes().await.map_err(|source| {
            ClientError::Transport {
                attempts: 1,
                source,
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ClientError::Decode { path, source })
    }

    /// Send and discard the response body.
    pub async fn send_empty(&self, req: ApiRequest) -> Result<(), ClientError> {
        self.execute(req).await.map(drop)
    }

    pub async fn send_bytes(&self, req: ApiRequest) -> Result<Vec<u8>, ClientError> {
        let response = self.execute(req).await?;
        let bytes = response.bytes().await.map_err(|source| ClientError::Transport {
            attempts: 1,
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// Send with retry; on a 401 refresh once and replay.
    ///
    /// An access token already past its local expiry is refreshed before the
    /// first send instead of spending a request on a certain 401. That counts
    /// as the request's one refresh.
    pub async fn execute(&self, req: ApiRequest) -> Result<Response, ClientError> {
        let pair = self.token_pair();
        if !req.skip_refresh
            && let Some(pair) = &pair
            && pair.access_expired_at(Utc::now())
        {
            tracing::debug!(path = %req.path, "Access token expired locally; refreshing first");
            let fresh = self.recover(Some(&pair.access)).await?;
            return self.send_after_refresh(&req, &fresh).await;
        }

        let token = pair.map(|pair| pair.access);
        let response = self.send_once(&req, token.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED || req.skip_refresh {
            return check(response).await;
        }
        drop(response);

        tracing::debug!(path = %req.path, "Request unauthorized; recovering session");
        let fresh = self.recover(token.as_ref()).await?;
        self.send_after_refresh(&req, &fresh).await
    }

    /// A 401 here is final: the request has had its refresh.
    async fn send_after_refresh(
        &self,
        req: &ApiRequest,
        fresh: &AccessToken,
    ) -> Result<Response, ClientError> {
        let response = self.send_once(req, Some(fresh)).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(path = %req.path, "Request still unauthorized after refresh");
            return Err(ClientError::Unauthorized);
        }
        check(response).await
    }

    async fn send_once(
        &self,
        req: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.inner.base_url, req.path);
        let build = || self.build(&url, req, token);
        send_with_retry(build, &self.inner.retry)
            .await
            .map_err(|TransportFailure { attempts, source }| {
                tracing::warn!(path = %req.path, attempts, "Request failed: {source}");
                ClientError::Transport { attempts, source }
            })
    }

    fn build(&self, url: &str, req: &ApiRequest, token: Option<&AccessToken>) -> RequestBuilder {
        let mut builder = self.inner.http.request(req.method.clone(), url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        match &req.body {
            Some(Body::Json(value)) => builder = builder.json(value),
            Some(Body::JsonPart { name, json }) => {
                builder = builder.multipart(json_form(name, json));
            }
            Some(Body::File {
                field,
                file_name,
                bytes,
                text,
            }) => {
                let file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                let form = text
                    .iter()
                    .fold(Form::new().part(field.clone(), file), |form, (k, v)| {
                        form.text(k.clone(), v.clone())
                    });
                builder = builder.multipart(form);
            }
            None => {}
        }
        if let Some(token) = token {
            builder = builder.header(reqwest::header::AUTHORIZATION, token.bearer());
        }
        builder
    }

    async fn recover(&self, failed_with: Option<&AccessToken>) -> Result<AccessToken, ClientError> {
        if self.token_pair().is_none() {
            self.expire();
            return Err(ClientError::SessionExpired);
        }

        let outcome = self
            .inner
            .refresh
            .recover(failed_with, || self.access_token(), || self.refresh_tokens())
            .await;

        match outcome {
            Ok(token) => Ok(token),
            Err(RefreshFailure::Rejected) => Err(ClientError::SessionExpired),
            Err(RefreshFailure::Aborted) => Err(ClientError::RefreshInterrupted),
        }
    }

    /// Leader side of the refresh: one attempt, no backoff.
    async fn refresh_tokens(&self) -> Result<AccessToken, RefreshFailure> {
        let Some(pair) = self.token_pair() else {
            self.expire();
            return Err(RefreshFailure::Rejected);
        };
        let body = TokenRefreshRequest {
            refresh_token: pair.refresh.expose_secret().to_string(),
        };
        let url = format!("{}{REFRESH_PATH}", self.inner.base_url);

        let response = match self.inner.http.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Token refresh request failed: {e}");
                self.expire();
                return Err(RefreshFailure::Rejected);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let text = read_capped_error_body(response).await;
            tracing::info!(status = %status, body = %text, "Refresh token rejected");
            self.expire();
            return Err(RefreshFailure::Rejected);
        }

        let auth = match response.json::<AuthResponse>().await {
            Ok(auth) => auth,
            Err(e) => {
                tracing::warn!("Malformed token refresh response: {e}");
                self.expire();
                return Err(RefreshFailure::Rejected);
            }
        };

        match self.store_auth(&auth) {
            Ok(pair) => {
                tracing::debug!("Access token refreshed");
                self.emit(SessionEvent::Refreshed);
                Ok(pair.access)
            }
            Err(e) => {
                tracing::warn!("Failed to store refreshed credentials: {e}");
                self.expire();
                Err(RefreshFailure::Rejected)
            }
        }
    }

    fn expire(&self) {
        if let Err(e) = self.inner.tokens.clear() {
            tracing::warn!("Failed to clear credentials: {e}");
        }
        self.emit(SessionEvent::Expired);
    }
}

fn json_form(name: &str, json: &str) -> Form {
    let part = match Part::text(json.to_string()).mime_str("application/json") {
        Ok(part) => part,
        Err(_) => Part::text(json.to_string()),
    };
    Form::new().part(name.to_string(), part)
}

/// Map a non-2xx response to [`ClientError::Api`].
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let raw = read_capped_error_body(response).await;
    let body = serde_json::from_str::<ApiErrorBody>(&raw).unwrap_or_default();
    tracing::debug!(status = %status, "API error: {raw}");
    Err(ClientError::Api { status, body, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_endpoints_never_refresh() {
        assert!(ApiRequest::post("/api/auth/login").skip_refresh);
        assert!(ApiRequest::post("/api/auth/register").skip_refresh);
        assert!(ApiRequest::post(REFRESH_PATH).skip_refresh);
        assert!(!ApiRequest::get("/api/auth/me").skip_refresh);
        assert!(ApiRequest::post("/api/auth/logout").without_refresh().skip_refresh);
    }

    #[test]
    fn optional_query_values_are_skipped() {
        let req = ApiRequest::get("/api/messages/conversations")
            .query("page", 0)
            .query_opt("search", None::<&str>)
            .query_opt("status", Some("PENDING"));
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "0".to_string()),
                ("status".to_string(), "PENDING".to_string()),
            ]
        );
    }
}
