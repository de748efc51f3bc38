use crate::errors::{ProviderError, ProviderResult};
use domain::Status;
use serde::{Deserialize, Serialize};

/// Insight content for a whole subject area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub overall_summary: String,
    pub kpi_details: Vec<KpiInsight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiInsight {
    pub kpi_name: String,
    pub status: Status,
    pub bullets: Vec<String>,
}

impl InsightReport {
    pub fn detail(&self, kpi_name: &str) -> Option<&KpiInsight> {
        self.kpi_details
            .iter()
            .find(|detail| detail.kpi_name.eq_ignore_ascii_case(kpi_name))
    }
}

/// Parse the model reply into an `InsightReport`.
///
/// The reply must be exactly one JSON object, optionally wrapped in a single
/// Markdown code fence. Any deviation fails the whole reply; nothing is
/// salvaged from a partially valid object.
pub fn parse_insight_response(raw: &str) -> ProviderResult<InsightReport> {
    let body = strip_code_fence(raw)?;
    if body.is_empty() {
        return Err(ProviderError::malformed("response body is empty"));
    }

    let report: InsightReport =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse {
            reason: "response is not a valid insight report".to_string(),
            source: Some(e),
        })?;

    if report.overall_summary.trim().is_empty() {
        return Err(ProviderError::malformed("overall_summary is blank"));
    }
    if let Some(index) = report
        .kpi_details
        .iter()
        .position(|detail| detail.kpi_name.trim().is_empty())
    {
        return Err(ProviderError::malformed(format!(
            "kpi_details[{index}] has a blank kpi_name"
        )));
    }

    Ok(report)
}

fn strip_code_fence(raw: &str) -> ProviderResult<&str> {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return Ok(trimmed);
    };

    // Drop the info string (```json)
    let inner = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => return Err(ProviderError::malformed("unterminated code fence")),
    };
    let inner = inner
        .trim_end()
        .strip_suffix("```")
        .ok_or_else(|| ProviderError::malformed("unterminated code fence"))?;

    if inner.contains("```") {
        return Err(ProviderError::malformed("more than one code fence in response"));
    }
    Ok(inner.trim())
}
