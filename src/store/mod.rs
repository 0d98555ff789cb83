//! Conversation and message persistence behind one interface, with an in-memory
//! implementation and a Supabase (PostgREST) one.

mod memory;
mod supabase;

pub use memory::InMemoryStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation {0} not found")]
    ConversationNotFound(Uuid),
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("store returned no {0} row")]
    MissingRow(&'static str),
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(&self, user_id: &str, title: &str, category: &str) -> Result<Conversation, StoreError>;

    /// The user's conversations, most recently updated first.
    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError>;

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, StoreError>;

    /// Appends a message and bumps the conversation's `updated_at`.
    async fn add_message(&self, conversation_id: Uuid, role: Role, content: &str) -> Result<Message, StoreError>;

    /// Messages of one conversation, oldest first.
    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError>;

    /// Returns `false` when no such conversation exists.
    async fn rename_conversation(&self, id: Uuid, title: &str) -> Result<bool, StoreError>;

    /// Deletes the conversation and its messages. Returns `false` when it did not exist.
    async fn delete_conversation(&self, id: Uuid) -> Result<bool, StoreError>;
}

const TITLE_WORDS: usize = 6;

/// Conversation title derived from the first message: its first six words.
pub fn title_from_message(message: &str) -> String {
    let words: Vec<&str> = message.split_whitespace().collect();
    let mut title = words.iter().take(TITLE_WORDS).copied().collect::<Vec<_>>().join(" ");
    if words.len() > TITLE_WORDS {
        title.push_str("...");
    }
    title
}
