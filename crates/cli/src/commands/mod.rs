pub mod check_config;
pub mod evaluate;
pub mod insights;

pub use check_config::CheckConfigCommand;
pub use evaluate::EvaluateCommand;
pub use insights::InsightsCommand;

use anyhow::{Context, Result};
use domain::{load_observations, KpiCatalog, KpiObservation};
use std::path::Path;

pub(crate) fn load_catalog(path: &Path) -> Result<KpiCatalog> {
    KpiCatalog::load(path)
        .with_context(|| format!("failed to load KPI definitions from {}", path.display()))
}

pub(crate) fn load_inputs(
    definitions: &Path,
    observations: &Path,
) -> Result<(KpiCatalog, Vec<KpiObservation>)> {
    let catalog = load_catalog(definitions)?;
    let observations = load_observations(observations)
        .with_context(|| format!("failed to load observations from {}", observations.display()))?;
    Ok((catalog, observations))
}
