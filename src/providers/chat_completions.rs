use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ensure_success, non_empty, settle, Provider, ProviderError};
use crate::config::Config;
use crate::constants::{MAX_COMPLETION_TOKENS, SAMPLING_TEMPERATURE};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Adapter for OpenAI-style `/chat/completions` endpoints (Groq, Together AI).
pub struct ChatCompletionsProvider {
    name: &'static str,
    url: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

impl ChatCompletionsProvider {
    pub fn new(
        name: &'static str,
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        client: Client,
    ) -> Self {
        Self {
            name,
            url: url.into(),
            model: model.into(),
            api_key,
            client,
        }
    }

    /// The fast-inference provider.
    pub fn groq(config: &Config, client: Client) -> Self {
        Self::new(
            "groq",
            config.groq_url.clone(),
            config.groq_model.clone(),
            config.groq_api_key.clone(),
            client,
        )
    }

    /// The secondary hosted provider.
    pub fn together(config: &Config, client: Client) -> Self {
        Self::new(
            "together",
            config.together_url.clone(),
            config.together_model.clone(),
            config.together_api_key.clone(),
            client,
        )
    }

    #[instrument(skip_all, fields(provider = self.name, model = %self.model))]
    async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_message },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: SAMPLING_TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let completion = response.json::<ChatCompletionResponse>().await?;
        debug!(choices = completion.choices.len(), "Received chat completion");

        non_empty(completion.choices.into_iter().next().and_then(|c| c.message.content))
    }
}

#[async_trait]
impl Provider for ChatCompletionsProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt(&self, system_prompt: &str, user_message: &str) -> Option<String> {
        settle(self.name, self.complete(system_prompt, user_message).await)
    }
}
