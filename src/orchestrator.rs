//! The provider cascade: hosted providers in priority order, then the local composer.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::category::Category;
use crate::composer;
use crate::config::Config;
use crate::providers::{self, ChatCompletionsProvider, HuggingFaceProvider, OllamaProvider, Provider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub category: Category,
    pub message: String,
    /// Earlier turns, most recent last.
    pub history: Vec<ChatTurn>,
}

impl ChatRequest {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }
}

/// Which path produced a response. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Provider(&'static str),
    LocalComposer,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSource::Provider(name) => f.write_str(name),
            ResponseSource::LocalComposer => f.write_str("local-composer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedResponse {
    pub text: String,
    pub source: ResponseSource,
}

enum CascadeState {
    TryProvider(usize),
    Fallback,
    Done(GeneratedResponse),
}

pub struct Orchestrator {
    providers: Vec<Arc<dyn Provider>>,
}

impl Orchestrator {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self {
        Self { providers }
    }

    /// No hosted providers; every answer comes from the local composer.
    pub fn offline() -> Self {
        Self::new(Vec::new())
    }

    /// The production cascade: Hugging Face, Groq, Together AI, then a local Ollama.
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let client = providers::http_client(config.request_timeout)?;
        Ok(Self::new(vec![
            Arc::new(HuggingFaceProvider::from_config(config, client.clone())),
            Arc::new(ChatCompletionsProvider::groq(config, client.clone())),
            Arc::new(ChatCompletionsProvider::together(config, client.clone())),
            Arc::new(OllamaProvider::from_config(config, client)),
        ]))
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn generate(&self, request: &ChatRequest) -> GeneratedResponse {
        self.generate_with_cancel(request, &CancellationToken::new()).await
    }

    /// Walks the providers in order and returns the first acceptable answer. Once
    /// `cancel` fires the in-flight attempt is abandoned, no further provider is
    /// tried, and the local composer answers. The result is never empty.
    #[instrument(skip_all, fields(category = %request.category, history = request.history.len()))]
    pub async fn generate_with_cancel(&self, request: &ChatRequest, cancel: &CancellationToken) -> GeneratedResponse {
        let system_prompt = request.category.system_prompt();
        let mut state = CascadeState::TryProvider(0);

        loop {
            state = match state {
                CascadeState::TryProvider(index) => match self.providers.get(index) {
                    None => CascadeState::Fallback,
                    Some(_) if cancel.is_cancelled() => {
                        info!("Request cancelled, skipping remaining providers");
                        CascadeState::Fallback
                    }
                    Some(provider) => {
                        debug!(provider = provider.name(), "Trying provider");
                        let answer = tokio::select! {
                            biased;
                            _ = cancel.cancelled() => None,
                            answer = provider.attempt(system_prompt, &request.message) => answer,
                        };
                        match answer {
                            Some(text) if is_acceptable(&text, provider.acceptance_floor()) => {
                                CascadeState::Done(GeneratedResponse {
                                    text,
                                    source: ResponseSource::Provider(provider.name()),
                                })
                            }
                            _ => CascadeState::TryProvider(index + 1),
                        }
                    }
                },
                CascadeState::Fallback => CascadeState::Done(GeneratedResponse {
                    text: composer::respond(&request.message, &request.category),
                    source: ResponseSource::LocalComposer,
                }),
                CascadeState::Done(response) => {
                    info!(source = %response.source, chars = response.text.chars().count(), "Generated response");
                    return response;
                }
            };
        }
    }
}

fn is_acceptable(text: &str, floor: usize) -> bool {
    text.trim().chars().count() > floor
}
