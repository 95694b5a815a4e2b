//! Error types for crdform-provider

use crdform_schema::{SchemaError, ValidationIssue};
use thiserror::Error;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors raised by the provider and its resources
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Provider data has an unexpected type
    #[error("unexpected provider data type: expected ProviderContext, got {type_name}")]
    Configuration { type_name: String },

    /// CRUD call on a resource that never received provider data
    #[error("resource '{0}' is not configured")]
    NotConfigured(String),

    /// Offline mode refuses every cluster round-trip
    #[error("provider is offline, cannot {operation} '{type_name}'")]
    Offline {
        operation: &'static str,
        type_name: String,
    },

    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Transport(#[from] kube::Error),

    /// Kubeconfig could not be loaded
    #[error("kubeconfig error: {0}")]
    Kubeconfig(String),

    /// Malformed import identifier
    #[error("invalid import id '{id}': {reason}")]
    Import { id: String, reason: String },

    /// State or manifest conversion failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// State violates the resource schema
    #[error("invalid '{type_name}' state:\n{}", format_issues(.issues))]
    Validation {
        type_name: String,
        issues: Vec<ValidationIssue>,
    },

    /// No resource registered under that type name
    #[error("unknown resource type '{0}'")]
    UnknownResourceType(String),

    /// State is missing something a request needs
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration file
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for ProviderError {
    fn from(e: serde_yaml::Error) -> Self {
        ProviderError::Serialization(e.to_string())
    }
}

impl ProviderError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::Transport(kube::Error::Api(resp)) if resp.code == 404)
    }

    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        matches!(self, ProviderError::Transport(kube::Error::Api(resp)) if resp.code == 409)
    }
}
