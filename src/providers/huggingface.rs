use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{ensure_success, settle, Provider, ProviderError};
use crate::config::Config;
use crate::constants::{HUGGINGFACE_MAX_NEW_TOKENS, HUGGINGFACE_MIN_CHARS, SAMPLING_TEMPERATURE};

const QUESTION_PREFIX: &str = "Question about creative writing:";
const ADVICE_PREFIX: &str = "Provide helpful advice for creative writing:";

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    do_sample: bool,
    top_p: f32,
    repetition_penalty: f32,
}

#[derive(Serialize)]
struct GenerationOptions {
    wait_for_model: bool,
    use_cache: bool,
}

#[derive(Serialize)]
struct GenerationRequest {
    inputs: String,
    parameters: GenerationParameters,
    options: GenerationOptions,
}

#[derive(Deserialize, Debug)]
struct Generation {
    generated_text: Option<String>,
}

// The inference API answers with either a list of candidates or a single object.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum GenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerationResponse::Batch(items) => items.into_iter().next().and_then(|g| g.generated_text),
            GenerationResponse::Single(g) => g.generated_text,
        }
    }
}

/// Models tend to echo the prompt scaffolding; drop it at the start of any line.
fn strip_scaffolding(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.strip_prefix(QUESTION_PREFIX)
                .or_else(|| line.strip_prefix(ADVICE_PREFIX))
                .unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Adapter for the Hugging Face inference API. Walks a list of candidate models and
/// keeps the first answer that is at least [`HUGGINGFACE_MIN_CHARS`] long.
pub struct HuggingFaceProvider {
    base_url: String,
    models: Vec<String>,
    api_key: Option<String>,
    client: Client,
}

impl HuggingFaceProvider {
    pub fn new(base_url: impl Into<String>, models: Vec<String>, api_key: Option<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            models,
            api_key,
            client,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(
            config.huggingface_url.clone(),
            config.huggingface_models.clone(),
            config.huggingface_api_key.clone(),
            client,
        )
    }

    #[instrument(skip(self, api_key, user_message))]
    async fn generate_with(&self, model: &str, api_key: &str, user_message: &str) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), model);
        let request = GenerationRequest {
            inputs: format!("{QUESTION_PREFIX} {user_message}\n\n{ADVICE_PREFIX}"),
            parameters: GenerationParameters {
                max_new_tokens: HUGGINGFACE_MAX_NEW_TOKENS,
                temperature: SAMPLING_TEMPERATURE,
                do_sample: true,
                top_p: 0.95,
                repetition_penalty: 1.15,
            },
            options: GenerationOptions {
                wait_for_model: true,
                use_cache: false,
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let text = response
            .json::<GenerationResponse>()
            .await?
            .into_text()
            .ok_or(ProviderError::Empty)?;
        let text = strip_scaffolding(&text);

        let len = text.chars().count();
        if len < HUGGINGFACE_MIN_CHARS {
            return Err(ProviderError::TooShort(len));
        }
        Ok(text)
    }

    async fn generate(&self, user_message: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let mut last_error = ProviderError::Empty;
        for model in &self.models {
            match self.generate_with(model, api_key, user_message).await {
                Ok(text) => {
                    info!(%model, "Hugging Face model produced a response");
                    return Ok(text);
                }
                Err(e) => {
                    debug!(%model, error = %e, "Hugging Face model failed, trying next");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    fn acceptance_floor(&self) -> usize {
        20
    }

    // The text-generation models get the user question only; the persona prompt
    // derails them more than it helps.
    async fn attempt(&self, _system_prompt: &str, user_message: &str) -> Option<String> {
        settle(self.name(), self.generate(user_message).await)
    }
}
