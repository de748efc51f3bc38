//! LLM access for KPI insight generation
//!
//! - `providers`: the `LlmProvider` trait with OpenAI-compatible and Anthropic backends
//! - `retry`: exponential backoff that keeps the typed error of the last attempt
//! - `settings`: provider selection from environment variables / `.env`
//! - `insights`: prompt construction, the strict response parser and `InsightGenerator`

pub mod errors;
pub mod insights;
pub mod providers;
pub mod retry;
pub mod settings;

pub use errors::{ProviderError, ProviderResult};
pub use insights::{
    build_user_prompt, parse_insight_response, InsightGenerator, InsightReport, KpiInsight,
    SYSTEM_PROMPT,
};
pub use providers::{
    AnthropicProvider, LlmProvider, LlmRequest, LlmResponse, OpenAIProvider, ProviderId,
    TokenUsage,
};
pub use retry::{execute_with_retry, RetryConfig, RetryableError};
pub use settings::{ProviderKind, ProviderSettings};
