use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{Conversation, ConversationStore, Message, Role, StoreError};
use crate::config::SupabaseConfig;
use crate::providers;

const CONVERSATIONS: &str = "conversations";
const MESSAGES: &str = "messages";

/// Store backed by Supabase's PostgREST interface (`/rest/v1/<table>`).
///
/// Ids and timestamps are generated by the database. Deleting a conversation relies on
/// the `messages.conversation_id` foreign key cascading.
pub struct SupabaseStore {
    rest_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseStore {
    pub fn new(config: &SupabaseConfig, client: Client) -> Self {
        Self {
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            anon_key: config.anon_key.clone(),
            client,
        }
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    fn select(&self, table: &str) -> RequestBuilder {
        self.request(Method::GET, table).query(&[("select", "*")])
    }

    // Writes ask PostgREST to echo the affected rows back.
    fn write(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, table).header("Prefer", "return=representation")
    }
}

async fn rows<T: DeserializeOwned>(request: RequestBuilder) -> Result<Vec<T>, StoreError> {
    let response = ensure_success(request.send().await?).await?;
    Ok(response.json::<Vec<T>>().await?)
}

async fn first_row<T: DeserializeOwned>(request: RequestBuilder, what: &'static str) -> Result<T, StoreError> {
    rows(request)
        .await?
        .into_iter()
        .next()
        .ok_or(StoreError::MissingRow(what))
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = providers::error_body(response).await;
    Err(StoreError::Status { status, body })
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl ConversationStore for SupabaseStore {
    #[instrument(skip(self, title))]
    async fn create_conversation(&self, user_id: &str, title: &str, category: &str) -> Result<Conversation, StoreError> {
        let request = self
            .write(Method::POST, CONVERSATIONS)
            .json(&json!({ "user_id": user_id, "title": title, "category": category }));
        first_row(request, "conversation").await
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let request = self
            .select(CONVERSATIONS)
            .query(&[("user_id", eq(user_id)), ("order", "updated_at.desc".to_string())]);
        rows(request).await
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        let request = self.select(CONVERSATIONS).query(&[("id", eq(id))]);
        Ok(rows(request).await?.into_iter().next())
    }

    #[instrument(skip(self, content))]
    async fn add_message(&self, conversation_id: Uuid, role: Role, content: &str) -> Result<Message, StoreError> {
        let request = self.write(Method::POST, MESSAGES).json(&json!({
            "conversation_id": conversation_id,
            "role": role,
            "content": content,
        }));
        let message: Message = first_row(request, "message").await?;

        let touched: Vec<Conversation> = rows(
            self.write(Method::PATCH, CONVERSATIONS)
                .query(&[("id", eq(conversation_id))])
                .json(&json!({ "updated_at": Utc::now() })),
        )
        .await?;
        if touched.is_empty() {
            debug!(%conversation_id, "Message stored but conversation timestamp not updated");
        }
        Ok(message)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError> {
        let request = self
            .select(MESSAGES)
            .query(&[("conversation_id", eq(conversation_id)), ("order", "created_at.asc".to_string())]);
        rows(request).await
    }

    async fn rename_conversation(&self, id: Uuid, title: &str) -> Result<bool, StoreError> {
        let updated: Vec<Conversation> = rows(
            self.write(Method::PATCH, CONVERSATIONS)
                .query(&[("id", eq(id))])
                .json(&json!({ "title": title, "updated_at": Utc::now() })),
        )
        .await?;
        Ok(!updated.is_empty())
    }

    async fn delete_conversation(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted: Vec<Conversation> = rows(self.write(Method::DELETE, CONVERSATIONS).query(&[("id", eq(id))])).await?;
        Ok(!deleted.is_empty())
    }
}
