//! Error types for the validator.
//!
//! Extraction and reconciliation never fail on malformed content; those
//! problems become findings in the report. `ValidatorError` covers the
//! outer layers only: reading files, parsing markup, configuration and
//! report serialization.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the validator library.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// XML parsing failed for a named document of a package.
    #[error("XML parsing failed for {name}: {source}")]
    DocumentParse {
        name: String,
        #[source]
        source: roxmltree::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Package path is missing or not a directory.
    #[error("Invalid package path: {}", .0.display())]
    InvalidPackagePath(PathBuf),

    /// Unknown validation mode.
    #[error("Invalid validation mode: '{0}'. Expected 'registration' or 'preview'")]
    InvalidMode(String),

    /// Similarity threshold outside of `0.0..=1.0`.
    #[error("Invalid similarity threshold: {0}. Expected a value between 0.0 and 1.0")]
    InvalidThreshold(f64),

    /// Configuration value that cannot be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path expression that the XML node view cannot interpret.
    #[error("Invalid path expression: '{0}'")]
    InvalidPath(String),

    /// Order value that is not a 5-digit string.
    #[error("Invalid order: '{0}'. Expected 5 digits (e.g., 00012)")]
    InvalidOrder(String),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),
}

/// Result type alias for validator operations.
pub type Result<T> = std::result::Result<T, ValidatorError>;
