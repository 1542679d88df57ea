use thiserror::Error;

/// Errors raised around the engine: reading inputs, decoding JSON and loading configuration.
///
/// The normalization core itself never returns these; malformed field values are
/// recovered locally and reported as [`crate::pipeline::processing::parser::DefaultedWarning`]s.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
