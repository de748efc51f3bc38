use crate::errors::{ProviderError, ProviderResult};
use domain::KpiFact;
use serde::Serialize;

/// Fixed instructions describing the only accepted reply shape
pub const SYSTEM_PROMPT: &str = "\
You are a network performance analyst. You receive pre-computed KPI facts for one \
subject area. Do not recompute statuses: the `status` of each fact is authoritative. \
Reply with a single JSON object and nothing else, using exactly this shape:
{
  \"overall_summary\": \"<two or three sentences for the whole subject area>\",
  \"kpi_details\": [
    {\"kpi_name\": \"<kpi>\", \"status\": \"Good|Watch|Critical|Unknown\", \"bullets\": [\"<observation>\", \"<recommendation>\"]}
  ]
}
Include one entry in kpi_details per fact, in the order given. Keep bullets short and \
reference the numbers (percent change, peer and industry deltas) where useful.";

#[derive(Serialize)]
struct PromptPayload<'a> {
    subject_area: &'a str,
    kpis: &'a [KpiFact],
}

/// Render the user message: the tab name plus the facts as pretty JSON
pub fn build_user_prompt(subject_area: &str, facts: &[KpiFact]) -> ProviderResult<String> {
    if facts.is_empty() {
        return Err(ProviderError::InvalidRequest(format!(
            "no enriched KPI facts for subject area '{subject_area}'"
        )));
    }

    let payload = PromptPayload {
        subject_area,
        kpis: facts,
    };
    let body = serde_json::to_string_pretty(&payload)
        .map_err(|e| ProviderError::InvalidRequest(format!("failed to serialize KPI facts: {e}")))?;

    Ok(format!(
        "Subject area: {subject_area}\n\
         Generate insights for the following {} KPI facts.\n\n{body}",
        facts.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{enrich_with_definition, Direction, KpiDefinition, KpiObservation};

    fn fact() -> KpiFact {
        let definition = KpiDefinition::new("Availability", "%", Direction::HigherIsBetter)
            .with_thresholds(99.0, 99.9)
            .with_peer_avg(99.7);
        enrich_with_definition(&KpiObservation::new("Availability", 99.95, 99.8), &definition)
            .unwrap()
    }

    #[test]
    fn test_prompt_contains_tab_and_facts() {
        let prompt = build_user_prompt("Accessibility", &[fact()]).unwrap();
        assert!(prompt.starts_with("Subject area: Accessibility"));
        assert!(prompt.contains("\"kpi\": \"Availability\""));
        assert!(prompt.contains("\"status\": \"Good\""));
        assert!(prompt.contains("\"peer_delta\""));
    }

    #[test]
    fn test_empty_facts_rejected() {
        assert!(matches!(
            build_user_prompt("Retainability", &[]),
            Err(ProviderError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_system_prompt_names_required_fields() {
        for field in ["overall_summary", "kpi_details", "kpi_name", "bullets"] {
            assert!(SYSTEM_PROMPT.contains(field));
        }
    }
}
