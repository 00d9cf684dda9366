//! Token refresh through the full request pipeline.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use staymate_client::{ClientError, MemoryTokenStore, SessionEvent, TokenStore};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    REFRESH_PATH, anonymous_client, auth_body, client_with_store, logged_in_client,
};

const UNREAD_PATH: &str = "/api/messages/unread-count";

async fn mount_unread(server: &MockServer, bearer: &str, status: u16) {
    let response = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({ "totalUnreadCount": 3 }))
    } else {
        ResponseTemplate::new(status)
    };
    Mock::given(method("GET"))
        .and(path(UNREAD_PATH))
        .and(header("Authorization", bearer))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;
    mount_unread(&server, "Bearer stale", 401).await;
    mount_unread(&server, "Bearer fresh", 200).await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(auth_body("fresh", "r2"))
                .set_delay(std::time::Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = logged_in_client(&server, "stale", "r1");
    let mut events = client.subscribe();

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.messages().unread_count().await
        }));
    }
    for task in tasks {
        let unread = task.await.unwrap().unwrap();
        assert_eq!(unread.total_unread_count, 3);
    }

    let pair = store.load().unwrap();
    assert_eq!(pair.access.expose_secret(), "fresh");
    assert_eq!(pair.refresh.expose_secret(), "r2");
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Refreshed);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn rejected_refresh_expires_the_session() {
    let server = MockServer::start().await;
    mount_unread(&server, "Bearer stale", 401).await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Refresh token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = logged_in_client(&server, "stale", "r1");
    let mut events = client.subscribe();

    let err = client.messages().unread_count().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired), "{err:?}");
    assert!(store.load().is_none());
    assert!(!client.has_credentials());
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
}

#[tokio::test]
async fn replay_that_is_still_unauthorized_fails_without_looping() {
    let server = MockServer::start().await;
    mount_unread(&server, "Bearer stale", 401).await;
    Mock::given(method("GET"))
        .and(path(UNREAD_PATH))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("fresh", "r2")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "stale", "r1");
    let err = client.messages().unread_count().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized), "{err:?}");
    assert!(client.has_credentials());
}

#[tokio::test]
async fn unauthorized_without_credentials_expires_without_refreshing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(UNREAD_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let mut events = client.subscribe();
    let err = client.messages().unread_count().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired), "{err:?}");
    assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
}

#[tokio::test]
async fn bad_login_is_an_api_error_not_a_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, store) = logged_in_client(&server, "stale", "r1");
    let request = staymate_types::LoginRequest {
        email: "a@example.com".into(),
        password: "wrong".into(),
    };
    let err = client.auth().login(&request).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    assert!(err.to_string().contains("Bad credentials"), "{err}");
    assert!(store.load().is_some());
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/properties/recommended"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/properties/recommended"))
        .and(header("X-Retry-Count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "token", "r1");
    let listings = client.properties().recommended().await.unwrap();
    assert!(listings.is_empty());
}

fn pair_expiring(
    access_in: chrono::Duration,
    refresh_in: chrono::Duration,
) -> staymate_types::TokenPair {
    let now = chrono::Utc::now();
    staymate_types::TokenPair {
        access: staymate_types::AccessToken::new("stale"),
        refresh: staymate_types::RefreshToken::new("r1"),
        access_expires_at: now + access_in,
        refresh_expires_at: now + refresh_in,
    }
}

#[tokio::test]
async fn expired_refresh_token_counts_as_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(UNREAD_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("fresh", "r2")))
        .expect(0)
        .mount(&server)
        .await;

    let pair = pair_expiring(chrono::Duration::minutes(5), -chrono::Duration::seconds(1));
    let store = Arc::new(MemoryTokenStore::with_pair(pair));
    let client = client_with_store(&server, store);
    assert!(!client.has_credentials());
    assert!(client.access_token().is_none());

    let err = client.messages().unread_count().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired), "{err:?}");
}

#[tokio::test]
async fn locally_expired_access_token_is_refreshed_before_sending() {
    let server = MockServer::start().await;
    mount_unread(&server, "Bearer fresh", 200).await;
    Mock::given(method("GET"))
        .and(path(UNREAD_PATH))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("fresh", "r2")))
        .expect(1)
        .mount(&server)
        .await;

    let pair = pair_expiring(-chrono::Duration::seconds(1), chrono::Duration::days(1));
    let store = Arc::new(MemoryTokenStore::with_pair(pair));
    let client = client_with_store(&server, store.clone());

    let unread = client.messages().unread_count().await.unwrap();
    assert_eq!(unread.total_unread_count, 3);
    assert_eq!(store.load().unwrap().access.expose_secret(), "fresh");
}
