//! Error types for configdrive-init

use thiserror::Error;

/// Main error type for provisioning operations
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Already provisioned: marker {0} exists")]
    AlreadyProvisioned(String),

    #[error("Cannot extract {field}: {source}")]
    Extraction {
        field: String,
        #[source]
        source: ExtractionError,
    },

    #[error("Mount error: {0}")]
    Mount(String),

    #[error("Command execution failed: {0}")]
    Command(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProvisionError {
    /// Create an extraction error for a named field
    pub fn extraction(field: impl Into<String>, source: ExtractionError) -> Self {
        Self::Extraction {
            field: field.into(),
            source,
        }
    }
}

/// Failure to pull a value out of the interface-definition text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The section has fewer lines than the positional layout requires
    #[error("line {index} is missing from the section")]
    MissingLine { index: usize },

    /// The line has no second whitespace-separated token
    #[error("line {line:?} has no value token")]
    MissingValue { line: String },
}
