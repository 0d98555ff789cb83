use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ensure_success, non_empty, settle, Provider, ProviderError};
use crate::config::Config;
use crate::constants::{OLLAMA_NUM_PREDICT, SAMPLING_TEMPERATURE};

// Structures matching Ollama's /api/generate endpoint
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool, // We want the full response, not a stream
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: Option<String>, // The generated text
    #[serde(default)]
    done: bool,
}

/// Adapter for a local Ollama daemon. Needs no credential; usually not running,
/// in which case the attempt quietly yields nothing.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            client,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(config.ollama_url.clone(), config.ollama_model.clone(), client)
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, system_prompt: &str, user_message: &str) -> Result<String, ProviderError> {
        let ollama_api_url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let request_payload = OllamaRequest {
            model: &self.model,
            prompt: format!("{system_prompt}\n\nUser: {user_message}\nAssistant:"),
            stream: false,
            options: OllamaOptions {
                temperature: SAMPLING_TEMPERATURE,
                num_predict: OLLAMA_NUM_PREDICT,
            },
        };

        let response = self
            .client
            .post(&ollama_api_url)
            .json(&request_payload)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let ollama_response = response.json::<OllamaResponse>().await?;
        debug!(done = ollama_response.done, "Received Ollama response");

        non_empty(ollama_response.response)
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn attempt(&self, system_prompt: &str, user_message: &str) -> Option<String> {
        match self.generate(system_prompt, user_message).await {
            // Most deployments have no local daemon.
            Err(ProviderError::Http(e)) if e.is_connect() => {
                debug!(error = %e, "Ollama is not running");
                None
            }
            result => settle(self.name(), result),
        }
    }
}
