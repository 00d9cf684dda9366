//! Shared fixtures for integration tests.
//!
//! Every test talks to a wiremock server standing in for the StayMate
//! backend.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};
use staymate_client::retry::RetryConfig;
use staymate_client::{ApiClient, MemoryTokenStore, TokenStore};
use staymate_types::{AccessToken, RefreshToken, TokenPair};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REFRESH_PATH: &str = "/api/auth/refresh-token";

/// Retries with no meaningful delay.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        jitter_factor: 0.0,
    }
}

pub fn client_with_store(server: &MockServer, store: Arc<dyn TokenStore>) -> ApiClient {
    let base = Url::parse(&server.uri()).unwrap();
    let http = staymate_client::http_client(Duration::from_secs(2), Duration::from_secs(5)).unwrap();
    ApiClient::with_http(http, &base, store, fast_retry())
}

/// Client without stored credentials.
pub fn anonymous_client(server: &MockServer) -> ApiClient {
    client_with_store(server, Arc::new(MemoryTokenStore::new()))
}

pub fn token_pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair::issued_at(
        AccessToken::new(access),
        RefreshToken::new(refresh),
        None,
        Utc::now(),
    )
}

/// Client holding `access`/`refresh`, plus the store for later inspection.
pub fn logged_in_client(
    server: &MockServer,
    access: &str,
    refresh: &str,
) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::with_pair(token_pair(access, refresh)));
    let client = client_with_store(server, store.clone());
    (client, store)
}

pub fn auth_body(access: &str, refresh: &str) -> Value {
    json!({
        "accessToken": access,
        "refreshToken": refresh,
        "tokenType": "Bearer",
        "expiresIn": 900_000
    })
}

pub fn user_json(id: i64, email: &str, roles: &[&str]) -> Value {
    json!({
        "id": id,
        "email": email,
        "firstName": "Test",
        "lastName": "User",
        "roles": roles,
        "roleSelected": true,
        "authProvider": "LOCAL",
        "enabled": true
    })
}

pub fn conversation_json(id: i64, name: &str, unread: u32, last: &str) -> Value {
    json!({
        "id": id,
        "otherParticipantId": 100 + id,
        "otherParticipantName": name,
        "lastMessage": last,
        "unreadCount": unread
    })
}

pub fn message_json(id: i64, conversation: i64, content: &str) -> Value {
    json!({
        "id": id,
        "conversationId": conversation,
        "senderId": 2,
        "senderName": "Ana",
        "recipientId": 1,
        "content": content,
        "createdAt": "2024-05-01T10:00:00"
    })
}

pub fn conversation_list(conversations: Vec<Value>, total_unread: u32) -> Value {
    json!({
        "conversations": conversations,
        "totalUnreadCount": total_unread,
        "page": 0,
        "size": 50
    })
}

pub async fn mount_current_user(server: &MockServer, user: Value) {
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .mount(server)
        .await;
}

pub async fn mount_refresh(server: &MockServer, access: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(access, refresh)))
        .mount(server)
        .await;
}
