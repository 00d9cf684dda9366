//! Conversation state kept by `Inbox`.

use pretty_assertions::assert_eq;
use serde_json::json;
use staymate_client::Inbox;
use staymate_types::{ConversationId, MessageResponse, NewMessageNotification, UserId};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{conversation_json, conversation_list, logged_in_client, message_json};

async fn mount_list(server: &MockServer, unread: u32) {
    Mock::given(method("GET"))
        .and(path("/api/messages/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(conversation_list(
            vec![
                conversation_json(5, "Ana", 0, "hello"),
                conversation_json(6, "Bo", unread, "ping"),
            ],
            unread,
        )))
        .mount(server)
        .await;
}

async fn mount_messages(server: &MockServer, id: i64, messages: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/api/messages/conversations/{id}/messages")))
        .and(query_param("size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": messages,
            "conversation": conversation_json(id, "Ana", 0, "hello")
        })))
        .mount(server)
        .await;
}

async fn mount_mark_read(server: &MockServer, id: i64, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/api/messages/conversations/{id}/read")))
        .respond_with(ResponseTemplate::new(200))
        .expect(times)
        .mount(server)
        .await;
}

fn incoming(id: i64, conversation: i64, content: &str) -> MessageResponse {
    serde_json::from_value(message_json(id, conversation, content)).unwrap()
}

#[tokio::test]
async fn open_loads_messages_marks_read_and_syncs() {
    let server = MockServer::start().await;
    mount_list(&server, 2).await;
    mount_messages(&server, 5, vec![message_json(1, 5, "hi"), message_json(2, 5, "there")]).await;
    mount_mark_read(&server, 5, 1).await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut inbox = Inbox::new(client);
    inbox.open(ConversationId::new(5)).await.unwrap();

    assert_eq!(inbox.selected().unwrap().id, ConversationId::new(5));
    assert_eq!(inbox.messages().len(), 2);
    assert_eq!(inbox.conversations().len(), 2);
    assert_eq!(inbox.total_unread(), 2);
}

#[tokio::test]
async fn incoming_message_for_open_conversation_is_appended_once() {
    let server = MockServer::start().await;
    mount_list(&server, 0).await;
    mount_messages(&server, 5, vec![message_json(1, 5, "hi")]).await;
    // Once on open, once per incoming message for the open conversation.
    mount_mark_read(&server, 5, 3).await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut inbox = Inbox::new(client);
    inbox.open(ConversationId::new(5)).await.unwrap();

    inbox.on_incoming(incoming(2, 5, "new")).await.unwrap();
    inbox.on_incoming(incoming(2, 5, "new")).await.unwrap();
    assert_eq!(inbox.messages().len(), 2);
    assert_eq!(inbox.messages()[1].content, "new");
}

#[tokio::test]
async fn incoming_message_elsewhere_only_resyncs() {
    let server = MockServer::start().await;
    mount_list(&server, 1).await;
    mount_messages(&server, 5, vec![]).await;
    mount_mark_read(&server, 5, 1).await;
    mount_mark_read(&server, 6, 0).await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut inbox = Inbox::new(client);
    inbox.open(ConversationId::new(5)).await.unwrap();
    inbox.on_incoming(incoming(9, 6, "ping")).await.unwrap();

    assert!(inbox.messages().is_empty());
    assert_eq!(inbox.total_unread(), 1);
}

#[tokio::test]
async fn alert_for_open_conversation_reloads_messages() {
    let server = MockServer::start().await;
    mount_list(&server, 0).await;
    mount_messages(&server, 5, vec![message_json(1, 5, "hi")]).await;
    mount_mark_read(&server, 5, 2).await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut inbox = Inbox::new(client);
    inbox.open(ConversationId::new(5)).await.unwrap();

    let alert = NewMessageNotification {
        conversation_id: ConversationId::new(5),
        sender_name: "Ana".into(),
        preview: "hi".into(),
    };
    inbox.on_new_message_alert(&alert).await.unwrap();
    assert_eq!(inbox.messages().len(), 1);
}

#[tokio::test]
async fn send_appends_and_ignores_blank_input() {
    let server = MockServer::start().await;
    mount_list(&server, 0).await;
    mount_messages(&server, 5, vec![]).await;
    mount_mark_read(&server, 5, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/messages/send"))
        .and(body_json(json!({
            "conversationId": 5,
            "content": "see you"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_json(3, 5, "see you")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut inbox = Inbox::new(client);
    assert!(inbox.send("hello").await.is_err());

    inbox.open(ConversationId::new(5)).await.unwrap();
    assert!(inbox.send("   ").await.unwrap().is_none());
    let sent = inbox.send(" see you ").await.unwrap().unwrap();
    assert_eq!(sent.content, "see you");
    assert_eq!(inbox.messages().len(), 1);
}

#[tokio::test]
async fn search_is_sent_and_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages/conversations"))
        .and(query_param("search", "bo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(conversation_list(
            vec![conversation_json(6, "Bo", 0, "ping")],
            0,
        )))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, 0).await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut inbox = Inbox::new(client);
    inbox.set_search(Some(" bo ")).await.unwrap();
    assert_eq!(inbox.search(), Some("bo"));
    assert_eq!(inbox.conversations().len(), 1);

    inbox.set_search(Some("")).await.unwrap();
    assert_eq!(inbox.search(), None);
    assert_eq!(inbox.conversations().len(), 2);
}

#[tokio::test]
async fn start_conversation_creates_and_opens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/messages/conversations"))
        .and(body_json(json!({ "recipientId": 42, "initialMessage": "is it free?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(conversation_json(5, "Ana", 0, "")))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, 0).await;
    mount_messages(&server, 5, vec![message_json(1, 5, "is it free?")]).await;
    mount_mark_read(&server, 5, 1).await;

    let (client, _store) = logged_in_client(&server, "a1", "r1");
    let mut inbox = Inbox::new(client);
    let opened = inbox
        .start_conversation(UserId::new(42), Some(" is it free? "))
        .await
        .unwrap();
    assert_eq!(opened.id, ConversationId::new(5));
    assert_eq!(inbox.messages().len(), 1);
}
