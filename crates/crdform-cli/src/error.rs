//! CLI error types with exit code handling
//!
//! Library errors are folded into [`CliError`], which knows its exit code and
//! renders through miette.

use crdform_provider::ProviderError;
use crdform_schema::SchemaError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// State failed validation
    #[error("Validation failed: {message}")]
    #[diagnostic(code(crdform::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// CRD could not be read or turned into a schema
    #[error("Schema error: {message}")]
    #[diagnostic(code(crdform::cli::schema))]
    Schema {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Cluster round-trip failed or was refused
    #[error("Cluster error: {message}")]
    #[diagnostic(code(crdform::cli::cluster))]
    Cluster {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(crdform::cli::io))]
    Io { message: String },

    /// Bad arguments
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Schema { .. } => exit_codes::SCHEMA_ERROR,
            CliError::Cluster { .. } => exit_codes::CLUSTER_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: None,
        }
    }

    /// Create a usage error with help text
    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other {
            message: format!("invalid JSON: {}", err),
        }
    }
}

impl From<SchemaError> for CliError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::TypeMismatch { .. } | SchemaError::InvalidJson { .. } => {
                CliError::validation(err.to_string())
            }
            other => CliError::Schema {
                message: other.to_string(),
                help: Some("Check that the file is an apiextensions.k8s.io/v1 CustomResourceDefinition".to_string()),
            },
        }
    }
}

impl From<ProviderError> for CliError {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        match err {
            ProviderError::Validation { .. }
            | ProviderError::Import { .. }
            | ProviderError::InvalidState(_) => CliError::Validation {
                message,
                help: None,
            },
            ProviderError::Offline { .. } => CliError::Cluster {
                message,
                help: Some("Drop --offline and unset CRDFORM_OFFLINE to reach the cluster".to_string()),
            },
            ProviderError::Transport(_)
            | ProviderError::Kubeconfig(_)
            | ProviderError::NotConfigured(_) => CliError::Cluster {
                message,
                help: None,
            },
            ProviderError::Schema(inner) => inner.into(),
            ProviderError::Io(_) => CliError::Io { message },
            ProviderError::UnknownResourceType(_) => CliError::Usage {
                message,
                help: Some("Run `crdform resources <crd>` to list available types".to_string()),
            },
            _ => CliError::Other { message },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::validation("x").exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(
            CliError::from(ProviderError::Offline {
                operation: "create",
                type_name: "t".to_string()
            })
            .exit_code(),
            exit_codes::CLUSTER_ERROR
        );
        assert_eq!(
            CliError::from(ProviderError::UnknownResourceType("t".to_string())).exit_code(),
            exit_codes::USAGE_ERROR
        );
        assert_eq!(
            CliError::from(SchemaError::InvalidCrd("x".to_string())).exit_code(),
            exit_codes::SCHEMA_ERROR
        );
    }
}
