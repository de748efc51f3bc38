//! Provider selection from environment variables (and `.env` via dotenv)

use crate::errors::{ProviderError, ProviderResult};
use crate::providers::{AnthropicProvider, LlmProvider, OpenAIProvider};
use crate::retry::RetryConfig;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_TOKENS: u32 = 1200;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_LOCAL_URL: &str = "http://localhost:1234/v1";
const DEFAULT_LOCAL_MODEL: &str = "llama-3.2-3b-instruct";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    /// Any OpenAI-compatible server (LM Studio, Ollama)
    Local,
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "local" => Ok(Self::Local),
            other => Err(ProviderError::Configuration(format!(
                "Unsupported LLM_PROVIDER: '{other}' (expected openai, anthropic or local)"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Local => "local",
        })
    }
}

/// Everything needed to build a provider and drive one insight request
#[derive(Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_tokens: u32,
    pub temperature: f32,
}

// Keys stay out of logs
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ProviderSettings {
    /// Read settings from the process environment, loading `.env` first if present
    pub fn from_env() -> ProviderResult<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup, used by tests
    pub fn from_lookup<F>(lookup: F) -> ProviderResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let kind = match var("LLM_PROVIDER") {
            Some(value) => value.parse()?,
            None => ProviderKind::OpenAI,
        };

        let (api_key, model) = match kind {
            ProviderKind::OpenAI => (
                Some(var("OPENAI_API_KEY").ok_or_else(|| {
                    ProviderError::Configuration("OPENAI_API_KEY is not set".to_string())
                })?),
                var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            ),
            ProviderKind::Anthropic => (
                Some(var("ANTHROPIC_API_KEY").ok_or_else(|| {
                    ProviderError::Configuration("ANTHROPIC_API_KEY is not set".to_string())
                })?),
                var("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            ),
            ProviderKind::Local => (
                None,
                var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string()),
            ),
        };

        let base_url = match kind {
            ProviderKind::Local => {
                Some(var("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LOCAL_URL.to_string()))
            }
            _ => var("LLM_BASE_URL"),
        };

        let timeout_secs: u64 = parse_var(&var, "LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ProviderError::Configuration(
                "LLM_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        let max_retries = parse_var(&var, "LLM_MAX_RETRIES", 0u32)?;
        let max_tokens = parse_var(&var, "MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        let temperature: f32 = parse_var(&var, "TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ProviderError::Configuration(format!(
                "TEMPERATURE must be within 0.0..=2.0, got {temperature}"
            )));
        }

        Ok(Self {
            kind,
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            max_tokens,
            temperature,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Retry policy for these settings; zero retries means a single attempt
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::conservative().with_max_retries(self.max_retries)
    }

    pub fn build_provider(&self) -> ProviderResult<Arc<dyn LlmProvider>> {
        info!(provider = %self.kind, model = %self.model, "Building LLM provider");

        let provider: Arc<dyn LlmProvider> = match self.kind {
            ProviderKind::OpenAI => Arc::new(OpenAIProvider::new(
                self.api_key.clone().unwrap_or_default(),
                self.model.clone(),
                self.base_url.clone(),
            )?),
            ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
                self.api_key.clone().unwrap_or_default(),
                self.model.clone(),
                self.base_url.clone(),
            )?),
            ProviderKind::Local => Arc::new(OpenAIProvider::local(
                self.base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOCAL_URL.to_string()),
                self.model.clone(),
            )?),
        };
        Ok(provider)
    }
}

fn parse_var<T, V>(var: &V, key: &str, default: T) -> ProviderResult<T>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            ProviderError::Configuration(format!("{key} has an invalid value: '{raw}'"))
        }),
        None => Ok(default),
    }
}
