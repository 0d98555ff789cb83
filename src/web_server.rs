use std::{any::Any, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    serve, Json, Router,
};
use chrono::{SecondsFormat, Utc};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::category::{Category, CategoryInfo};
use crate::constants::{STATIC_DIR, TEMPLATE_DIR};
use crate::error::{ApiError, MISSING_CHAT_FIELDS};
use crate::orchestrator::{ChatRequest, ChatTurn, Orchestrator};
use crate::store::{self, Conversation, ConversationStore, Message, Role};

const ERROR_FALLBACK_MESSAGE: &str = "I'm having trouble connecting to my creative writing brain right now. Let me help you with some general writing advice instead!

**Quick Writing Tips:**
- Write regularly, even if just for 15 minutes
- Read widely in your genre
- Get feedback from other writers
- Don't edit while drafting
- Remember: all first drafts need revision

How can I help with your writing project today?";

// Shared application state
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn ConversationStore>,
    templates: Arc<AutoReloader>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            orchestrator,
            store,
            templates: Arc::new(create_minijinja_env()),
        }
    }
}

// Minijinja Environment setup
fn create_minijinja_env() -> AutoReloader {
    AutoReloader::new(|notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(TEMPLATE_DIR));
        notifier.watch_path(TEMPLATE_DIR, true);
        Ok(env)
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatPayload {
    message: Option<String>,
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_history")]
    conversation_history: Vec<ChatTurn>,
}

/// Keeps the well-formed `{role, content}` turns. Anything else, including a
/// non-array value, is dropped rather than failing the request.
fn lenient_history<'de, D>(deserializer: D) -> Result<Vec<ChatTurn>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let turns: Vec<ChatTurn> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if turns.len() < total {
        debug!(dropped = total - turns.len(), "Ignored malformed conversation history entries");
    }
    Ok(turns)
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    pub category: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error_fallback: bool,
}

impl ChatReply {
    fn new(message: String, category: String) -> Self {
        Self {
            message,
            category,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            is_error_fallback: false,
        }
    }

    fn error_fallback() -> Self {
        Self {
            is_error_fallback: true,
            ..Self::new(ERROR_FALLBACK_MESSAGE.to_string(), "general".to_string())
        }
    }
}

/// Trimmed value of a required text field, `None` when missing or blank.
fn required(field: Option<String>) -> Option<String> {
    field.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn index_handler(State(state): State<AppState>) -> Response {
    let categories: Vec<CategoryInfo> = Category::PRIMARY.iter().map(Category::catalogue_entry).collect();
    let rendered = state.templates.acquire_env().and_then(|env| {
        env.get_template("index.html").and_then(|tmpl| {
            tmpl.render(minijinja::context! {
                title => "Artemis - Creative Writing Assistant",
                categories => categories,
            })
        })
    });
    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to get or render template: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("Internal Server Error: {}", e))).into_response()
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn categories_handler() -> Json<Vec<CategoryInfo>> {
    Json(Category::PRIMARY.iter().map(Category::catalogue_entry).collect())
}

// A client disconnect drops this future, which also stops the provider cascade.
async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(%rejection, "Rejected chat request body");
        ApiError::BadRequest(MISSING_CHAT_FIELDS)
    })?;
    // Both are passed on exactly as sent; blank values count as missing.
    let message = payload.message.filter(|m| !m.trim().is_empty());
    let category = payload.category.filter(|c| !c.trim().is_empty());
    let (Some(message), Some(category)) = (message, category) else {
        return Err(ApiError::BadRequest(MISSING_CHAT_FIELDS));
    };

    info!(%category, message_chars = message.chars().count(), "Processing chat request");

    let request = ChatRequest::new(Category::parse(&category), message)
        .with_history(payload.conversation_history);
    let response = state.orchestrator.generate(&request).await;

    Ok(Json(ChatReply::new(response.text, category)))
}

fn chat_panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Chat handler panicked, answering with the static fallback");
    Json(ChatReply::error_fallback()).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewConversation {
    user_id: Option<String>,
    title: Option<String>,
    category: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct RenameConversation {
    title: Option<String>,
}

#[derive(Deserialize)]
struct NewMessage {
    role: Role,
    content: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationChatPayload {
    user_id: Option<String>,
    category: Option<String>,
    message: Option<String>,
    conversation_id: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationChatReply {
    conversation: Conversation,
    user_message: Message,
    assistant_message: Message,
}

async fn create_conversation_handler(
    State(state): State<AppState>,
    Json(payload): Json<NewConversation>,
) -> Result<(StatusCode, Json<Conversation>), ApiError> {
    let user_id = required(payload.user_id).ok_or(ApiError::BadRequest("userId is required"))?;
    let category = required(payload.category).ok_or(ApiError::BadRequest("category is required"))?;
    let title = required(payload.title).unwrap_or_else(|| "New conversation".to_string());

    let conversation = state.store.create_conversation(&user_id, &title, &category).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

async fn list_conversations_handler(
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let user_id = required(query.user_id).ok_or(ApiError::BadRequest("userId is required"))?;
    Ok(Json(state.store.list_conversations(&user_id).await?))
}

async fn load_conversation(state: &AppState, id: Uuid) -> Result<Conversation, ApiError> {
    state
        .store
        .get_conversation(id)
        .await?
        .ok_or(ApiError::NotFound("conversation"))
}

async fn get_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Conversation>, ApiError> {
    Ok(Json(load_conversation(&state, id).await?))
}

async fn rename_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenameConversation>,
) -> Result<StatusCode, ApiError> {
    let title = required(payload.title).ok_or(ApiError::BadRequest("title is required"))?;
    if state.store.rename_conversation(id, &title).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("conversation"))
    }
}

async fn delete_conversation_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete_conversation(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("conversation"))
    }
}

async fn list_messages_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, ApiError> {
    load_conversation(&state, id).await?;
    Ok(Json(state.store.list_messages(id).await?))
}

async fn add_message_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewMessage>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let content = required(payload.content).ok_or(ApiError::BadRequest("content is required"))?;
    load_conversation(&state, id).await?;
    let message = state.store.add_message(id, payload.role, &content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Chat inside a stored conversation: creates the conversation on first use, records
/// both sides of the exchange, and feeds earlier messages to the orchestrator.
async fn conversation_chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ConversationChatPayload>,
) -> Result<Json<ConversationChatReply>, ApiError> {
    let user_id = required(payload.user_id).ok_or(ApiError::BadRequest("userId is required"))?;
    let (Some(message), Some(category)) = (required(payload.message), required(payload.category)) else {
        return Err(ApiError::BadRequest(MISSING_CHAT_FIELDS));
    };

    let conversation = match payload.conversation_id {
        Some(id) => load_conversation(&state, id).await?,
        None => {
            let title = store::title_from_message(&message);
            state.store.create_conversation(&user_id, &title, &category).await?
        }
    };

    let history = state
        .store
        .list_messages(conversation.id)
        .await?
        .into_iter()
        .map(|m| ChatTurn {
            role: m.role.as_str().to_string(),
            content: m.content,
        })
        .collect();

    let user_message = state.store.add_message(conversation.id, Role::User, &message).await?;

    let request = ChatRequest::new(Category::parse(&category), message).with_history(history);
    let response = state.orchestrator.generate(&request).await;

    let assistant_message = state
        .store
        .add_message(conversation.id, Role::Assistant, &response.text)
        .await?;
    let conversation = load_conversation(&state, conversation.id).await?;

    Ok(Json(ConversationChatReply {
        conversation,
        user_message,
        assistant_message,
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/categories", get(categories_handler))
        .route(
            "/api/chat",
            post(chat_handler).layer(CatchPanicLayer::custom(chat_panic_response)),
        )
        .route("/api/chat/conversation", post(conversation_chat_handler))
        .route(
            "/api/conversations",
            get(list_conversations_handler).post(create_conversation_handler),
        )
        .route(
            "/api/conversations/:id",
            get(get_conversation_handler)
                .patch(rename_conversation_handler)
                .delete(delete_conversation_handler),
        )
        .route(
            "/api/conversations/:id/messages",
            get(list_messages_handler).post(add_message_handler),
        )
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn start_web_server(port: u16, state: AppState) -> Result<()> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank_values() {
        assert_eq!(required(Some(" hi ".to_string())).as_deref(), Some("hi"));
        assert_eq!(required(Some("   ".to_string())), None);
        assert_eq!(required(None), None);
    }

    #[test]
    fn test_history_keeps_only_well_formed_turns() {
        let payload: ChatPayload = serde_json::from_value(json!({
            "message": "Hi",
            "category": "general",
            "conversationHistory": [
                { "role": "user", "content": "Hello" },
                { "role": "user" },
                { "role": "assistant", "content": null },
                "stray"
            ]
        }))
        .unwrap();
        assert_eq!(
            payload.conversation_history,
            vec![ChatTurn { role: "user".to_string(), content: "Hello".to_string() }]
        );

        let payload: ChatPayload =
            serde_json::from_value(json!({ "message": "Hi", "category": "general", "conversationHistory": "none" }))
                .unwrap();
        assert!(payload.conversation_history.is_empty());

        let payload: ChatPayload = serde_json::from_value(json!({ "message": "Hi", "category": "general" })).unwrap();
        assert!(payload.conversation_history.is_empty());
    }

    #[test]
    fn test_error_fallback_shape() {
        let value = serde_json::to_value(ChatReply::error_fallback()).unwrap();
        assert_eq!(value["category"], "general");
        assert_eq!(value["isErrorFallback"], true);
        assert!(value["message"].as_str().unwrap().contains("Quick Writing Tips"));
    }

    #[test]
    fn test_regular_reply_omits_fallback_flag() {
        let value = serde_json::to_value(ChatReply::new("hi".to_string(), "general".to_string())).unwrap();
        assert!(value.get("isErrorFallback").is_none());
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
