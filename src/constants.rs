// Provider endpoints, model ids and tuning knobs.
// Endpoints and models can be overridden from the environment (or a .env file).

use std::env;

/// Shared by every adapter so provider answers have a comparable tone.
pub const SAMPLING_TEMPERATURE: f32 = 0.8;

/// Token ceiling for the chat-completions providers.
pub const MAX_COMPLETION_TOKENS: u32 = 1000;

/// Token ceiling for the Hugging Face text-generation models.
pub const HUGGINGFACE_MAX_NEW_TOKENS: u32 = 200;

/// Token ceiling for the local Ollama daemon.
pub const OLLAMA_NUM_PREDICT: u32 = 500;

/// Hugging Face answers shorter than this are discarded and the next model is tried.
pub const HUGGINGFACE_MIN_CHARS: usize = 30;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_PORT: u16 = 3000;

pub const TEMPLATE_DIR: &str = "templates";
pub const STATIC_DIR: &str = "static";

lazy_static::lazy_static! {
    pub static ref OLLAMA_URL: String = env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
    pub static ref OLLAMA_MODEL: String = env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2:3b".to_string());

    pub static ref GROQ_URL: String = env::var("GROQ_URL").unwrap_or_else(|_| "https://api.groq.com/openai/v1/chat/completions".to_string());
    pub static ref GROQ_MODEL: String = env::var("GROQ_MODEL").unwrap_or_else(|_| "llama3-8b-8192".to_string());

    pub static ref TOGETHER_URL: String = env::var("TOGETHER_URL").unwrap_or_else(|_| "https://api.together.xyz/v1/chat/completions".to_string());
    pub static ref TOGETHER_MODEL: String = env::var("TOGETHER_MODEL").unwrap_or_else(|_| "meta-llama/Llama-2-7b-chat-hf".to_string());

    pub static ref HUGGINGFACE_URL: String = env::var("HUGGINGFACE_URL").unwrap_or_else(|_| "https://api-inference.huggingface.co/models".to_string());
    // Tried in order until one produces a usable answer.
    pub static ref HUGGINGFACE_MODELS: Vec<String> = vec![
        "google/flan-t5-large".to_string(),
        "microsoft/DialoGPT-medium".to_string(),
        "bigscience/bloom-560m".to_string(),
    ];
}
