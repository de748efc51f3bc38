use super::{normalize_base_url, LlmProvider, LlmRequest, LlmResponse, ProviderId, TokenUsage};
use crate::errors::{ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{error, info};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The messages API requires `max_tokens`
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl AnthropicProvider {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> ProviderResult<Self> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Anthropic API key cannot be empty".to_string(),
            ));
        }
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
            base_url: normalize_base_url(
                base_url.as_deref().unwrap_or(ANTHROPIC_BASE_URL),
            ),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new("anthropic", &self.model)
    }

    async fn complete(&self, request: LlmRequest) -> ProviderResult<LlmResponse> {
        let start_time = Instant::now();

        // The system prompt is a top-level field, not a message
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: request.system_prompt.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
        };

        info!(
            provider = "anthropic",
            model = %self.model,
            prompt_chars = request.prompt.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::transport("anthropic", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(provider = "anthropic", status = status.as_u16(), "API error: {}", error_text);
            return Err(ProviderError::Http {
                provider: "anthropic".to_string(),
                status: status.as_u16(),
                body: error_text,
            });
        }

        let raw = response
            .text()
            .await
            .map_err(|e| ProviderError::transport("anthropic", e))?;
        let anthropic_response: AnthropicResponse =
            serde_json::from_str(&raw).map_err(|e| ProviderError::MalformedResponse {
                reason: "unexpected anthropic response envelope".to_string(),
                source: Some(e),
            })?;

        let content: String = anthropic_response
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse {
                provider: "anthropic".to_string(),
            });
        }

        let usage = anthropic_response
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens));
        let elapsed = start_time.elapsed();

        info!(
            provider = "anthropic",
            duration_ms = elapsed.as_millis() as u64,
            total_tokens = usage.map(|u| u.total_tokens).unwrap_or(0),
            "Received completion"
        );

        Ok(LlmResponse {
            content,
            usage,
            model: anthropic_response.model.unwrap_or_else(|| self.model.clone()),
            response_time: elapsed,
        })
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    model: Option<String>,
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type", default = "text_block")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

fn text_block() -> String {
    "text".to_string()
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}
