use std::time::Duration;

use artemis::config::SupabaseConfig;
use artemis::providers;
use artemis::store::{ConversationStore, Role, StoreError, SupabaseStore};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONVERSATION_ID: &str = "6f1c2a34-9d3e-4c1b-8a55-0b7d2f6e9a10";

fn store(server: &MockServer) -> SupabaseStore {
    let config = SupabaseConfig {
        url: server.uri(),
        anon_key: "anon-key".to_string(),
    };
    SupabaseStore::new(&config, providers::http_client(Duration::from_secs(5)).unwrap())
}

fn conversation_row(title: &str) -> serde_json::Value {
    json!({
        "id": CONVERSATION_ID,
        "user_id": "user-1",
        "title": title,
        "category": "plot-brainstorming",
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

#[test_log::test(tokio::test)]
async fn test_create_conversation_posts_row() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/conversations"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({ "user_id": "user-1", "title": "Twists", "category": "plot-brainstorming" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([conversation_row("Twists")])))
        .expect(1)
        .mount(&server)
        .await;

    let conversation = store(&server)
        .create_conversation("user-1", "Twists", "plot-brainstorming")
        .await
        .unwrap();
    assert_eq!(conversation.id.to_string(), CONVERSATION_ID);
    assert_eq!(conversation.title, "Twists");
}

#[test_log::test(tokio::test)]
async fn test_list_conversations_filters_and_orders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/conversations"))
        .and(query_param("user_id", "eq.user-1"))
        .and(query_param("order", "updated_at.desc"))
        .and(query_param("select", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([conversation_row("A"), conversation_row("B")])))
        .mount(&server)
        .await;

    let listed = store(&server).list_conversations("user-1").await.unwrap();
    let titles: Vec<_> = listed.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B"]);
}

#[test_log::test(tokio::test)]
async fn test_get_missing_conversation_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/conversations"))
        .and(query_param("id", format!("eq.{CONVERSATION_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let id = Uuid::parse_str(CONVERSATION_ID).unwrap();
    assert!(store(&server).get_conversation(id).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_add_message_touches_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/messages"))
        .and(body_partial_json(json!({ "conversation_id": CONVERSATION_ID, "role": "user", "content": "Hello" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": "0c8e7b7a-1111-4d2f-9a3b-5c6d7e8f9a0b",
            "conversation_id": CONVERSATION_ID,
            "role": "user",
            "content": "Hello",
            "created_at": "2024-05-01T10:01:00Z"
        }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/conversations"))
        .and(query_param("id", format!("eq.{CONVERSATION_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([conversation_row("Twists")])))
        .expect(1)
        .mount(&server)
        .await;

    let id = Uuid::parse_str(CONVERSATION_ID).unwrap();
    let message = store(&server).add_message(id, Role::User, "Hello").await.unwrap();
    assert_eq!(message.role, Role::User);
    assert_eq!(message.conversation_id, id);
}

#[test_log::test(tokio::test)]
async fn test_delete_reports_whether_row_existed() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let id = Uuid::parse_str(CONVERSATION_ID).unwrap();
    assert!(!store(&server).delete_conversation(id).await.unwrap());
}

#[test_log::test(tokio::test)]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let err = store(&server).list_conversations("user-1").await.unwrap_err();
    assert!(matches!(err, StoreError::Status { status, ref body } if status.as_u16() == 401 && body == "Invalid API key"));
}

#[test_log::test(tokio::test)]
async fn test_error_body_is_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(5000)))
        .mount(&server)
        .await;

    let err = store(&server).list_conversations("user-1").await.unwrap_err();
    let body = match err {
        StoreError::Status { body, .. } => body,
        other => panic!("expected a status error, got {other:?}"),
    };
    assert_eq!(body.chars().count(), 200);
}
