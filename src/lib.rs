pub mod config;
pub mod constants;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod source_loader;

// Typed views over raw initiative records
pub mod domain;

// Processing stages and the pipeline facade
pub mod pipeline;

pub mod observability;

pub use config::Config;
pub use domain::{RawInitiativeMap, SchemaVersion};
pub use error::{CatalogError, Result};
pub use pipeline::{Pipeline, PipelineResult};
