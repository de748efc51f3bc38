pub mod enrichment;

pub use enrichment::{enrich, enrich_all, enrich_with_definition, EnrichmentReport};
