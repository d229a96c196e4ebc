use shared_pdf::PlacementError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SigningError {
    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("Document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error("Signature image {index} is {size} bytes, limit is {limit}")]
    ImageTooLarge {
        index: usize,
        size: usize,
        limit: usize,
    },

    #[error("Signing request has no placements")]
    NoPlacements,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
