use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{Conversation, ConversationStore, Message, Role, StoreError};

#[derive(Default)]
struct Tables {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing timestamps, so ordering by time is also ordering by write.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }

    fn conversation_mut(&mut self, id: Uuid) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }
}

/// Process-local store, one instance per server or per test.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn create_conversation(&self, user_id: &str, title: &str, category: &str) -> Result<Conversation, StoreError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.conversations.push(conversation.clone());
        debug!(id = %conversation.id, "Created conversation");
        Ok(conversation)
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, StoreError> {
        let tables = self.tables.read().await;
        let mut conversations: Vec<Conversation> = tables
            .conversations
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.conversations.iter().find(|c| c.id == id).cloned())
    }

    async fn add_message(&self, conversation_id: Uuid, role: Role, content: &str) -> Result<Message, StoreError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let conversation = tables
            .conversation_mut(conversation_id)
            .ok_or(StoreError::ConversationNotFound(conversation_id))?;
        conversation.updated_at = now;

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            content: content.to_string(),
            created_at: now,
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(messages)
    }

    async fn rename_conversation(&self, id: Uuid, title: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        match tables.conversation_mut(id) {
            Some(conversation) => {
                conversation.title = title.to_string();
                conversation.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_conversation(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.conversations.len();
        tables.conversations.retain(|c| c.id != id);
        if tables.conversations.len() == before {
            return Ok(false);
        }
        tables.messages.retain(|m| m.conversation_id != id);
        debug!(%id, "Deleted conversation");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_conversation() {
        let store = InMemoryStore::new();
        let created = store
            .create_conversation("user-1", "Dragons", "story-development")
            .await
            .unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get_conversation(created.id).await.unwrap();
        assert_eq!(fetched, Some(created));
        assert!(store.get_conversation(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_conversations_filters_by_user_and_orders_by_update() {
        let store = InMemoryStore::new();
        let first = store.create_conversation("user-1", "First", "general").await.unwrap();
        let second = store.create_conversation("user-1", "Second", "general").await.unwrap();
        store.create_conversation("user-2", "Other", "general").await.unwrap();

        let listed = store.list_conversations("user-1").await.unwrap();
        let titles: Vec<_> = listed.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);

        store.add_message(first.id, Role::User, "bump").await.unwrap();
        let listed = store.list_conversations("user-1").await.unwrap();
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test]
    async fn test_messages_are_ordered_and_bump_conversation() {
        let store = InMemoryStore::new();
        let conversation = store.create_conversation("u", "t", "general").await.unwrap();

        let question = store.add_message(conversation.id, Role::User, "Hello").await.unwrap();
        let answer = store.add_message(conversation.id, Role::Assistant, "Hi!").await.unwrap();
        assert!(answer.created_at > question.created_at);

        let messages = store.list_messages(conversation.id).await.unwrap();
        assert_eq!(messages, vec![question, answer.clone()]);

        let updated = store.get_conversation(conversation.id).await.unwrap().unwrap();
        assert_eq!(updated.updated_at, answer.created_at);
    }

    #[tokio::test]
    async fn test_add_message_to_unknown_conversation() {
        let store = InMemoryStore::new();
        let id = Uuid::new_v4();
        let err = store.add_message(id, Role::User, "lost").await.unwrap_err();
        assert!(matches!(err, StoreError::ConversationNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_rename_conversation() {
        let store = InMemoryStore::new();
        let conversation = store.create_conversation("u", "Old", "general").await.unwrap();
        assert!(store.rename_conversation(conversation.id, "New").await.unwrap());
        let renamed = store.get_conversation(conversation.id).await.unwrap().unwrap();
        assert_eq!(renamed.title, "New");
        assert!(renamed.updated_at > conversation.updated_at);
        assert!(!store.rename_conversation(Uuid::new_v4(), "x").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_conversation_removes_messages() {
        let store = InMemoryStore::new();
        let keep = store.create_conversation("u", "Keep", "general").await.unwrap();
        let gone = store.create_conversation("u", "Gone", "general").await.unwrap();
        store.add_message(keep.id, Role::User, "a").await.unwrap();
        store.add_message(gone.id, Role::User, "b").await.unwrap();

        assert!(store.delete_conversation(gone.id).await.unwrap());
        assert!(!store.delete_conversation(gone.id).await.unwrap());
        assert!(store.list_messages(gone.id).await.unwrap().is_empty());
        assert_eq!(store.list_messages(keep.id).await.unwrap().len(), 1);
        assert_eq!(store.list_conversations("u").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_separate_instances_do_not_share_state() {
        let a = InMemoryStore::new();
        let b = InMemoryStore::new();
        a.create_conversation("u", "t", "general").await.unwrap();
        assert!(b.list_conversations("u").await.unwrap().is_empty());
    }
}
