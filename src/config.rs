use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

use crate::constants;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("ARTEMIS_PROVIDER_TIMEOUT_SECS must be a positive integer, got {0:?}")]
    InvalidTimeout(String),
    #[error("unknown store backend {0:?} (expected \"memory\" or \"supabase\")")]
    UnknownStore(String),
    #[error("{0} is required when the supabase store is selected")]
    MissingSupabase(&'static str),
}

/// Where conversations and messages are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StoreBackend {
    #[default]
    Memory,
    Supabase,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mock" => Ok(StoreBackend::Memory),
            "supabase" => Ok(StoreBackend::Supabase),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

/// Runtime configuration, read once at process start.
#[derive(Debug, Clone)]
pub struct Config {
    pub huggingface_api_key: Option<String>,
    pub huggingface_url: String,
    pub huggingface_models: Vec<String>,
    pub groq_api_key: Option<String>,
    pub groq_url: String,
    pub groq_model: String,
    pub together_api_key: Option<String>,
    pub together_url: String,
    pub together_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    /// Upper bound for every outbound provider or store call.
    pub request_timeout: Duration,
    pub store: StoreBackend,
    pub supabase: Option<SupabaseConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let request_timeout = match get("ARTEMIS_PROVIDER_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(constants::DEFAULT_TIMEOUT_SECS),
        };

        let store = match get("ARTEMIS_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreBackend::default(),
        };

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig { url, anon_key }),
            _ => None,
        };

        Ok(Config {
            huggingface_api_key: get("HUGGINGFACE_API_KEY"),
            huggingface_url: get("HUGGINGFACE_URL").unwrap_or_else(|| constants::HUGGINGFACE_URL.clone()),
            huggingface_models: constants::HUGGINGFACE_MODELS.clone(),
            groq_api_key: get("GROQ_API_KEY"),
            groq_url: get("GROQ_URL").unwrap_or_else(|| constants::GROQ_URL.clone()),
            groq_model: get("GROQ_MODEL").unwrap_or_else(|| constants::GROQ_MODEL.clone()),
            together_api_key: get("TOGETHER_API_KEY"),
            together_url: get("TOGETHER_URL").unwrap_or_else(|| constants::TOGETHER_URL.clone()),
            together_model: get("TOGETHER_MODEL").unwrap_or_else(|| constants::TOGETHER_MODEL.clone()),
            ollama_url: get("OLLAMA_URL").unwrap_or_else(|| constants::OLLAMA_URL.clone()),
            ollama_model: get("OLLAMA_MODEL").unwrap_or_else(|| constants::OLLAMA_MODEL.clone()),
            request_timeout,
            store,
            supabase,
        })
    }

    /// The Supabase settings, or an error naming the first missing variable.
    pub fn require_supabase(&self) -> Result<&SupabaseConfig, ConfigError> {
        self.supabase
            .as_ref()
            .ok_or(ConfigError::MissingSupabase("SUPABASE_URL and SUPABASE_ANON_KEY"))
    }

    /// Which provider credentials are present, for the start-up log line.
    pub fn credential_summary(&self) -> String {
        format!(
            "huggingface={} groq={} together={}",
            self.huggingface_api_key.is_some(),
            self.groq_api_key.is_some(),
            self.together_api_key.is_some()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert!(config.huggingface_api_key.is_none());
        assert!(config.groq_api_key.is_none());
        assert!(config.together_api_key.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(config.supabase.is_none());
        assert_eq!(config.huggingface_models.len(), 3);
    }

    #[test]
    fn test_empty_credentials_count_as_absent() {
        let config = config_from(&[("GROQ_API_KEY", "  "), ("TOGETHER_API_KEY", "tk")]).unwrap();
        assert!(config.groq_api_key.is_none());
        assert_eq!(config.together_api_key.as_deref(), Some("tk"));
    }

    #[test]
    fn test_timeout_override_and_validation() {
        let config = config_from(&[("ARTEMIS_PROVIDER_TIMEOUT_SECS", "3")]).unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(3));

        let err = config_from(&[("ARTEMIS_PROVIDER_TIMEOUT_SECS", "0")]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout("0".to_string()));

        let err = config_from(&[("ARTEMIS_PROVIDER_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout("soon".to_string()));
    }

    #[test]
    fn test_store_selection() {
        let config = config_from(&[
            ("ARTEMIS_STORE", "Supabase"),
            ("SUPABASE_URL", "https://db.example"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreBackend::Supabase);
        assert_eq!(config.require_supabase().unwrap().url, "https://db.example");

        let err = config_from(&[("ARTEMIS_STORE", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownStore(_)));
    }

    #[test]
    fn test_require_supabase_reports_missing_settings() {
        let config = config_from(&[("SUPABASE_URL", "https://db.example")]).unwrap();
        assert!(config.require_supabase().is_err());
    }

    #[test]
    fn test_endpoint_overrides() {
        let config = config_from(&[("OLLAMA_URL", "http://127.0.0.1:9"), ("GROQ_MODEL", "mixtral")]).unwrap();
        assert_eq!(config.ollama_url, "http://127.0.0.1:9");
        assert_eq!(config.groq_model, "mixtral");
    }
}
