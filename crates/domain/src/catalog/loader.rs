//! File format detection and observation loading

use crate::entities::KpiObservation;
use crate::errors::{CatalogError, CatalogResult};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> CatalogResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            _ => Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Parse a list of observations in the given format
pub fn parse_observations(content: &str, format: FileFormat) -> CatalogResult<Vec<KpiObservation>> {
    match format {
        FileFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|source| CatalogError::Yaml { source })
        }
        FileFormat::Json => {
            serde_json::from_str(content).map_err(|source| CatalogError::Json { source })
        }
    }
}

/// Load observations from a `.yaml`/`.yml`/`.json` file holding a list of
/// `{kpi, current, prior}` records
pub fn load_observations<P: AsRef<Path>>(path: P) -> CatalogResult<Vec<KpiObservation>> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let observations = parse_observations(&content, format)?;
    info!(
        path = %path.display(),
        observations = observations.len(),
        "Loaded KPI observations"
    );
    Ok(observations)
}
