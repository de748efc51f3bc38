use crate::errors::ProviderResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod anthropic_provider;
pub mod openai_provider;

pub use anthropic_provider::AnthropicProvider;
pub use openai_provider::OpenAIProvider;

/// Request object for LLM providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            system_prompt: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: &str) -> Self {
        self.system_prompt = Some(system_prompt.to_string());
        self
    }

    pub fn with_parameters(mut self, max_tokens: Option<u32>, temperature: Option<f32>) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }
}

/// Response object from LLM providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub usage: Option<TokenUsage>,
    pub model: String,
    pub response_time: Duration,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Provider identification
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderId {
    pub provider_type: String,
    pub model: String,
}

impl ProviderId {
    pub fn new(provider_type: &str, model: &str) -> Self {
        Self {
            provider_type: provider_type.to_string(),
            model: model.to_string(),
        }
    }
}

/// Unified LLM Provider trait
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique identifier for this provider instance
    fn id(&self) -> ProviderId;

    /// Execute completion request
    async fn complete(&self, request: LlmRequest) -> ProviderResult<LlmResponse>;

    /// Get human-readable name
    fn name(&self) -> String {
        let id = self.id();
        format!("{} ({})", id.provider_type, id.model)
    }
}

/// Strip a trailing slash so paths can be appended with `/`
pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::new("facts")
            .with_system_prompt("be terse")
            .with_parameters(Some(256), Some(0.1));
        assert_eq!(request.prompt, "facts");
        assert_eq!(request.system_prompt.as_deref(), Some("be terse"));
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(0.1));
    }

    #[test]
    fn test_token_usage_total() {
        assert_eq!(TokenUsage::new(10, 5).total_tokens, 15);
    }

    #[test]
    fn test_token_usage_total_saturates() {
        let usage = TokenUsage::new(u32::MAX, 5);
        assert_eq!(usage.total_tokens, u32::MAX);
        assert_eq!(usage.completion_tokens, 5);
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:1234/v1/"), "http://localhost:1234/v1");
        assert_eq!(normalize_base_url(" https://api.openai.com/v1 "), "https://api.openai.com/v1");
    }
}
