//! Domain Layer - KPI definitions, observations and fact enrichment
//!
//! Contains the pure calculation that turns raw KPI numbers into the
//! structured facts consumed by the insight generator:
//! - Entities: `KpiDefinition`, `KpiObservation`, `KpiFact`
//! - Value Objects: `Direction`, `Status`, `Thresholds`, `PercentChange`
//! - Catalog: immutable name -> definition lookup loaded from YAML/JSON
//! - Services: enrichment with per-observation error isolation
//!
//! Nothing here performs network I/O or keeps shared mutable state.

pub mod catalog;
pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;

pub use catalog::{load_observations, FileFormat, KpiCatalog};
pub use entities::{KpiDefinition, KpiFact, KpiObservation};
pub use errors::{CatalogError, CatalogResult, EnrichmentError, EnrichmentResult};
pub use services::{enrich, enrich_all, enrich_with_definition, EnrichmentReport};
pub use value_objects::{Direction, PercentChange, Status, Thresholds};
