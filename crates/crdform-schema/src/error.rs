//! Error types for crdform-schema

use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while reading CRDs or converting between state and manifests
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// CRD document could not be decoded
    #[error("invalid CRD document: {0}")]
    Parse(String),

    /// CRD document is missing a required field or is not a CRD
    #[error("invalid CRD: {0}")]
    InvalidCrd(String),

    /// Requested CRD version does not exist
    #[error("CRD '{crd}' has no version '{version}'")]
    UnknownVersion { crd: String, version: String },

    /// A state value does not match the attribute type
    #[error("attribute '{path}': expected {expected}, got {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A JSON-encoded attribute does not hold valid JSON
    #[error("attribute '{path}' does not hold valid JSON: {message}")]
    InvalidJson { path: String, message: String },
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(e: serde_yaml::Error) -> Self {
        SchemaError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Parse(e.to_string())
    }
}
