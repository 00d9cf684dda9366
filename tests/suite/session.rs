//! Login, logout and role handling through `Session`.

use pretty_assertions::assert_eq;
use serde_json::json;
use staymate_client::{Session, SessionEvent, TokenStore};
use staymate_types::{Role, SelectableRole};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{anonymous_client, auth_body, logged_in_client, mount_current_user, user_json};

#[tokio::test]
async fn login_stores_tokens_and_loads_the_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "owner@example.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("a1", "r1")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(
            1,
            "owner@example.com",
            &["ROLE_USER", "ROLE_HOUSE_OWNER"],
        )))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let mut events = client.subscribe();
    let mut session = Session::new(client.clone());

    let user = session.login(" owner@example.com ", "pw").await.unwrap();
    assert_eq!(user.email, "owner@example.com");
    assert!(session.is_authenticated());
    assert!(session.is_house_owner());
    assert!(!session.is_admin());
    assert!(!session.is_regular_user());
    assert!(session.has_role(Role::User));
    assert_eq!(client.access_token().unwrap().expose_secret(), "a1");
    assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedIn);
}

#[tokio::test]
async fn failed_user_fetch_after_login_clears_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("a1", "r1")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    let mut session = Session::new(client.clone());
    assert!(session.login("a@example.com", "pw").await.is_err());
    assert!(!session.is_authenticated());
    assert!(!client.has_credentials());
}

#[tokio::test]
async fn logout_clears_local_state_even_when_the_server_fails() {
    let server = MockServer::start().await;
    mount_current_user(&server, user_json(1, "a@example.com", &["ROLE_USER"])).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (client, store) = logged_in_client(&server, "a1", "r1");
    let mut session = Session::new(client.clone());
    assert!(session.refresh_user().await.is_some());
    assert!(session.is_regular_user());

    let mut events = session.subscribe();
    session.logout().await;
    assert!(!session.is_authenticated());
    assert!(store.load().is_none());
    assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
}

#[tokio::test]
async fn select_role_updates_the_user() {
    let server = MockServer::start().await;
    let mut user = user_json(7, "g@example.com", &["ROLE_USER", "ROLE_HOUSE_OWNER"]);
    user["authProvider"] = json!("GOOGLE");
    Mock::given(method("POST"))
        .and(path("/api/auth/select-role"))
        .and(body_json(json!({ "role": "HOUSE_OWNER" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut session = Session::new(client);
    let user = session.select_role(SelectableRole::HouseOwner).await.unwrap();
    assert!(user.is_house_owner());
    assert!(!session.needs_role_selection());
}

#[tokio::test]
async fn oauth_user_without_role_needs_selection() {
    let server = MockServer::start().await;
    let mut user = user_json(8, "g@example.com", &["ROLE_USER"]);
    user["authProvider"] = json!("GOOGLE");
    user["roleSelected"] = json!(false);
    mount_current_user(&server, user).await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut session = Session::new(client);
    session.refresh_user().await.unwrap();
    assert!(session.needs_role_selection());
}
