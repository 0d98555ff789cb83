//! Artemis: a creative-writing chat assistant.
//!
//! Replies come from a cascade of hosted and local language models and, when none of
//! them answers, from a rule-based composer that never fails.

pub mod analyzer;
pub mod category;
pub mod chat;
pub mod composer;
pub mod config;
pub mod constants;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod store;
pub mod web_server;

pub use category::Category;
pub use config::{Config, StoreBackend};
pub use orchestrator::{ChatRequest, GeneratedResponse, Orchestrator, ResponseSource};
pub use store::{ConversationStore, InMemoryStore, SupabaseStore};
pub use web_server::{router, AppState};
