// Catalog pipeline: processing stages and the one-call facade

pub mod pipeline;
pub mod processing;

// Re-export key types and functions from each stage
pub use pipeline::{Pipeline, PipelineResult};
pub use processing::aggregate::{build_auxiliary, AggregateConfig, AuxiliaryData};
pub use processing::normalize::{build_table, CanonicalInitiativeRecord, CatalogBuild, CatalogConfig, OverridePolicy};
pub use processing::parser;
pub use processing::quality_gate::{validate, ValidationConfig, ValidationReport};
