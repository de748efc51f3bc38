//! KPI Catalog - immutable name -> definition lookup
//!
//! Built once from a definition file (YAML or JSON) or from code, then
//! passed by reference into the enricher. There is no process-wide state:
//! tests construct whatever catalog they need.

mod loader;

pub use loader::{load_observations, FileFormat};

use crate::entities::KpiDefinition;
use crate::errors::{CatalogError, CatalogResult};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// On-disk shape of a definition file
#[derive(Debug, Deserialize)]
struct CatalogFile {
    kpis: BTreeMap<String, KpiDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiCatalog {
    definitions: BTreeMap<String, KpiDefinition>,
}

impl KpiCatalog {
    /// Build a catalog from definitions. Names must be unique and non-empty.
    ///
    /// Inconsistent definitions (e.g. inverted thresholds) are accepted here
    /// and surface as per-observation `InvalidValue` errors during enrichment.
    pub fn new(definitions: impl IntoIterator<Item = KpiDefinition>) -> CatalogResult<Self> {
        let mut map = BTreeMap::new();
        for definition in definitions {
            let name = definition.name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if map.contains_key(&name) {
                return Err(CatalogError::DuplicateKpi(name));
            }
            map.insert(name, definition);
        }
        Ok(Self { definitions: map })
    }

    pub fn from_yaml_str(content: &str) -> CatalogResult<Self> {
        let file: CatalogFile =
            serde_yaml::from_str(content).map_err(|source| CatalogError::Yaml { source })?;
        Self::from_file_shape(file)
    }

    pub fn from_json_str(content: &str) -> CatalogResult<Self> {
        let file: CatalogFile =
            serde_json::from_str(content).map_err(|source| CatalogError::Json { source })?;
        Self::from_file_shape(file)
    }

    /// Load a definition file, picking the parser from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = match format {
            FileFormat::Yaml => Self::from_yaml_str(&content)?,
            FileFormat::Json => Self::from_json_str(&content)?,
        };

        info!(
            path = %path.display(),
            kpis = catalog.len(),
            "Loaded KPI definitions"
        );
        Ok(catalog)
    }

    fn from_file_shape(file: CatalogFile) -> CatalogResult<Self> {
        Self::new(file.kpis.into_iter().map(|(key, mut definition)| {
            debug!(kpi = %key, "Registering KPI definition");
            definition.name = key;
            definition
        }))
    }

    pub fn get(&self, name: &str) -> Option<&KpiDefinition> {
        self.definitions.get(name.trim())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in name order
    pub fn iter(&self) -> impl Iterator<Item = &KpiDefinition> {
        self.definitions.values()
    }

    /// Distinct subject areas (dashboard tabs), sorted
    pub fn subject_areas(&self) -> BTreeSet<&str> {
        self.definitions
            .values()
            .filter_map(|d| d.subject_area.as_deref())
            .collect()
    }

    pub fn in_subject_area<'a>(
        &'a self,
        subject_area: &'a str,
    ) -> impl Iterator<Item = &'a KpiDefinition> + 'a {
        self.definitions
            .values()
            .filter(move |d| d.belongs_to(subject_area))
    }

    /// Every definition that would fail enrichment, with the reason
    pub fn validation_issues(&self) -> Vec<(String, String)> {
        self.definitions
            .values()
            .filter_map(|d| d.validate().err().map(|reason| (d.name.clone(), reason)))
            .collect()
    }
}
