//! Error types for SSP documents

use std::path::PathBuf;

use thiserror::Error;

/// Result type for SSP operations
pub type Result<T> = std::result::Result<T, SspError>;

/// SSP document errors
#[derive(Error, Debug)]
pub enum SspError {
    #[error("Failed to read {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("The {hook} hook is not implemented for {document}")]
    UnimplementedHook {
        hook: &'static str,
        document: &'static str,
    },

    #[error("{} does not conform to the '{identifier}' schema:\n{diagnostic}", .path.display())]
    SchemaValidation {
        identifier: String,
        path: PathBuf,
        diagnostic: String,
    },

    #[error("No schema registered for identifier '{0}'")]
    MissingSchema(String),

    #[error("Schema file for '{identifier}' not found at {}", .path.display())]
    MissingSchemaFile { identifier: String, path: PathBuf },

    #[error("Schema {} could not be compiled:\n{diagnostic}", .path.display())]
    InvalidSchema { path: PathBuf, diagnostic: String },

    #[error("Schema validator unavailable: {0}")]
    ValidatorUnavailable(String),

    #[error("Expected element <{expected}>, found <{found}>")]
    UnexpectedTag { expected: String, found: String },

    #[error("Element <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Element <{element}> is missing required child <{child}>")]
    MissingChild { element: String, child: String },

    #[error("Invalid value '{value}' for '{attribute}' on <{element}>: {reason}")]
    InvalidValue {
        element: String,
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("Document has no root element to write")]
    MissingRoot,

    #[error("XML serialization error: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl SspError {
    /// Whether this error was raised while reading a document from disk
    pub fn is_read_error(&self) -> bool {
        matches!(self, SspError::Read { .. })
    }

    /// Whether this error is a schema conformance failure
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, SspError::SchemaValidation { .. })
    }
}
