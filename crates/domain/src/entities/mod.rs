pub mod kpi_definition;
pub mod kpi_fact;
pub mod kpi_observation;

pub use kpi_definition::KpiDefinition;
pub use kpi_fact::KpiFact;
pub use kpi_observation::KpiObservation;
