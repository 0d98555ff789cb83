//! Adapters for the hosted (and local) language-model providers.
//!
//! Every adapter has the same contract: given a system prompt and a user message it
//! either returns usable text or `None`. Failures are logged here and never reach the
//! orchestrator.

mod chat_completions;
mod huggingface;
mod ollama;

pub use chat_completions::ChatCompletionsProvider;
pub use huggingface::HuggingFaceProvider;
pub use ollama::OllamaProvider;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// The orchestrator accepts an answer only when it is longer than this many characters.
    fn acceptance_floor(&self) -> usize {
        0
    }

    async fn attempt(&self, system_prompt: &str, user_message: &str) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("provider returned no text")]
    Empty,
    #[error("response too short ({0} chars)")]
    TooShort(usize),
}

/// Client shared by all adapters. The timeout bounds every provider call.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// Turns a non-2xx response into [`ProviderError::Status`], keeping a prefix of the body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ProviderError::Status {
        status,
        body: error_body(response).await,
    })
}

const ERROR_BODY_CHARS: usize = 200;

/// The first 200 characters of an error response body, for logs and error values.
pub(crate) async fn error_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string())
        .chars()
        .take(ERROR_BODY_CHARS)
        .collect()
}

/// Logs a failed attempt and collapses the result into the adapter contract.
pub(crate) fn settle(provider: &'static str, result: Result<String, ProviderError>) -> Option<String> {
    match result {
        Ok(text) => Some(text),
        Err(ProviderError::MissingCredential) => {
            debug!(provider, "no API key configured, skipping");
            None
        }
        Err(e) => {
            warn!(provider, error = %e, "provider attempt failed");
            None
        }
    }
}

/// Trims provider output; whitespace-only text counts as no text.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ProviderError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(Some("  hello \n".to_string())).unwrap(), "hello");
        assert!(matches!(non_empty(Some(" \n".to_string())), Err(ProviderError::Empty)));
        assert!(matches!(non_empty(None), Err(ProviderError::Empty)));
    }

    #[test]
    fn test_settle_swallows_errors() {
        assert_eq!(settle("test", Ok("text".to_string())), Some("text".to_string()));
        assert_eq!(settle("test", Err(ProviderError::MissingCredential)), None);
        assert_eq!(settle("test", Err(ProviderError::TooShort(3))), None);
    }
}
