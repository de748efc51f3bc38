//! Insight generation for one subject-area tab: prompt, provider call, parse

pub mod prompt;
pub mod response;

pub use prompt::{build_user_prompt, SYSTEM_PROMPT};
pub use response::{parse_insight_response, InsightReport, KpiInsight};

use crate::errors::{ProviderError, ProviderResult};
use crate::providers::{LlmProvider, LlmRequest};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::settings::{ProviderSettings, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS};
use domain::KpiFact;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Issues exactly one logical insight request per call.
///
/// Every attempt is bounded by `timeout`. Retries (if any) only cover the
/// provider call; a reply that fails to parse is reported immediately.
pub struct InsightGenerator {
    provider: Arc<dyn LlmProvider>,
    retry: RetryConfig,
    timeout: Duration,
    max_tokens: u32,
    temperature: f32,
}

impl InsightGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> ProviderResult<Self> {
        Ok(Self::new(settings.build_provider()?)
            .with_retry(settings.retry_config())
            .with_timeout(settings.timeout)
            .with_parameters(settings.max_tokens, settings.temperature))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_parameters(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn provider_name(&self) -> String {
        self.provider.name()
    }

    #[instrument(skip(self, facts), fields(provider = %self.provider.name(), kpis = facts.len()))]
    pub async fn generate(&self, subject_area: &str, facts: &[KpiFact]) -> ProviderResult<InsightReport> {
        let start = Instant::now();
        let prompt = build_user_prompt(subject_area, facts)?;
        let request = LlmRequest::new(&prompt)
            .with_system_prompt(SYSTEM_PROMPT)
            .with_parameters(Some(self.max_tokens), Some(self.temperature));

        let response = execute_with_retry(&self.retry, || {
            let provider = Arc::clone(&self.provider);
            let request = request.clone();
            let timeout = self.timeout;
            async move {
                match tokio::time::timeout(timeout, provider.complete(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(timeout)),
                }
            }
        })
        .await?;

        let report = parse_insight_response(&response.content).map_err(|e| {
            warn!(model = %response.model, "Discarding provider reply: {}", e);
            e
        })?;

        info!(
            model = %response.model,
            details = report.kpi_details.len(),
            total_tokens = response.usage.map(|u| u.total_tokens).unwrap_or(0),
            duration_ms = start.elapsed().as_millis() as u64,
            "Insights generated for '{}'",
            subject_area
        );
        Ok(report)
    }

    /// Like `generate`, but aborts the in-flight call when `cancel` fires
    pub async fn generate_with_cancellation(
        &self,
        subject_area: &str,
        facts: &[KpiFact],
        cancel: &CancellationToken,
    ) -> ProviderResult<InsightReport> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Insight request for '{}' cancelled", subject_area);
                Err(ProviderError::Cancelled)
            }
            result = self.generate(subject_area, facts) => result,
        }
    }
}
