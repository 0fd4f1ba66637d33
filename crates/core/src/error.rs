//! Error types for the transformation engine

use thiserror::Error;

/// Engine errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No value specified for the mandatory configuration parameter `{0}`")]
    MissingConfig(String),

    #[error("Invalid batch size {0}: batches must hold at least one document")]
    InvalidBatchSize(usize),

    #[error("Invalid identifier `{0}`: expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),

    #[error("Document {document} does not have property `{property}`. The text field can be configured with `nodeProperty`")]
    MissingProperty { document: String, property: String },

    #[error("Write mode requires an open graph transaction")]
    WriteWithoutTransaction,

    #[error("Document {0} is not stored; write mode requires ingested documents")]
    EphemeralSourceInWriteMode(String),

    #[error("Analysis kind `{0}` produces no graph; use the stream call shape")]
    UnsupportedGraphKind(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, CoreError>;
