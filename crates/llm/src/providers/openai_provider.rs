use super::{normalize_base_url, LlmProvider, LlmRequest, LlmResponse, ProviderId, TokenUsage};
use crate::errors::{ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat-completions provider. Also serves any OpenAI-compatible
/// endpoint (LM Studio, Ollama, vLLM) through `local`.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    api_key: Option<String>,
    model: String,
    base_url: String,
    provider_type: &'static str,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> ProviderResult<Self> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "OpenAI API key cannot be empty".to_string(),
            ));
        }

        Self::build(
            Some(api_key),
            model,
            base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            "openai",
        )
    }

    /// OpenAI-compatible server that needs no API key
    pub fn local(base_url: String, model: String) -> ProviderResult<Self> {
        if base_url.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Local LLM base URL cannot be empty".to_string(),
            ));
        }
        Self::build(None, model, base_url, "local")
    }

    fn build(
        api_key: Option<String>,
        model: String,
        base_url: String,
        provider_type: &'static str,
    ) -> ProviderResult<Self> {
        if model.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Model name cannot be empty".to_string(),
            ));
        }

        // No client-level timeout: the caller bounds each attempt
        let client = Client::builder()
            .build()
            .map_err(|e| ProviderError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            model,
            base_url: normalize_base_url(&base_url),
            provider_type,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new(self.provider_type, &self.model)
    }

    async fn complete(&self, request: LlmRequest) -> ProviderResult<LlmResponse> {
        let start_time = Instant::now();

        let mut messages = Vec::with_capacity(2);
        if let Some(system_prompt) = &request.system_prompt {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system_prompt.clone(),
            });
        }
        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        let body = OpenAIChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        info!(
            provider = self.provider_type,
            model = %self.model,
            prompt_chars = request.prompt.len(),
            "Sending completion request"
        );
        debug!(endpoint = %self.endpoint(), "OpenAI-compatible endpoint");

        let mut http_request = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(api_key) = &self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| ProviderError::transport(self.provider_type, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(provider = self.provider_type, status = status.as_u16(), "API error: {}", error_text);
            return Err(ProviderError::Http {
                provider: self.provider_type.to_string(),
                status: status.as_u16(),
                body: error_text,
            });
        }

        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::transport(self.provider_type, e))?;
        let chat_response: OpenAIChatResponse =
            serde_json::from_str(&raw).map_err(|e| ProviderError::MalformedResponse {
                reason: format!("unexpected {} response envelope", self.provider_type),
                source: Some(e),
            })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: self.provider_type.to_string(),
            })?;

        let usage = chat_response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
        let elapsed = start_time.elapsed();

        info!(
            provider = self.provider_type,
            duration_ms = elapsed.as_millis() as u64,
            total_tokens = usage.map(|u| u.total_tokens).unwrap_or(0),
            "Received completion"
        );

        Ok(LlmResponse {
            content,
            usage,
            model: chat_response.model.unwrap_or_else(|| self.model.clone()),
            response_time: elapsed,
        })
    }
}

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
