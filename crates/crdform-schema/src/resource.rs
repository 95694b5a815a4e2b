//! Complete Terraform-facing schema for one CRD kind and version

use serde::Serialize;

use crate::attribute::{Attribute, Attributes};
use crate::crd::{CrdScope, GroupVersionResource};

/// Synthetic identifier attribute (`namespace/name`)
pub const ID_ATTRIBUTE: &str = "id";
/// Per-instance override of the server-side apply force flag
pub const FORCE_CONFLICTS_ATTRIBUTE: &str = "force_conflicts";
/// Per-instance override of the server-side apply field manager
pub const FIELD_MANAGER_ATTRIBUTE: &str = "field_manager";
/// Post-mutation wait conditions
pub const WAIT_FOR_ATTRIBUTE: &str = "wait_for";

/// Top-level attributes that exist only in Terraform state, never in the manifest
pub const BOOKKEEPING_ATTRIBUTES: &[&str] = &[
    ID_ATTRIBUTE,
    FORCE_CONFLICTS_ATTRIBUTE,
    FIELD_MANAGER_ATTRIBUTE,
    WAIT_FOR_ATTRIBUTE,
];

/// Default timeout for a `wait_for` entry
pub const DEFAULT_WAIT_TIMEOUT: &str = "30s";

/// Schema of one resource type
///
/// Built once from a CRD by [`SchemaBuilder`](crate::SchemaBuilder) and shared
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSchema {
    /// Terraform resource type name
    pub type_name: String,
    /// API address used for every request
    pub gvr: GroupVersionResource,
    /// `kind` injected into every manifest
    pub kind: String,
    pub scope: CrdScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Warning for a deprecated CRD version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
    /// Top-level attributes, bookkeeping first
    pub attributes: Attributes,
}

impl ResourceSchema {
    /// `apiVersion` injected into every manifest
    pub fn api_version(&self) -> String {
        self.gvr.api_version()
    }

    pub fn is_bookkeeping(display_name: &str) -> bool {
        BOOKKEEPING_ATTRIBUTES.contains(&display_name)
    }

    /// Top-level attributes that map onto the Kubernetes manifest
    pub fn domain_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .values()
            .filter(|a| !Self::is_bookkeeping(&a.display_name))
    }

    /// Look up an attribute by dot-separated display path (e.g. `spec.issuer_ref.name`)
    pub fn attribute(&self, path: &str) -> Option<&Attribute> {
        let mut parts = path.split('.');
        let mut current = self.attributes.get(parts.next()?)?;
        for part in parts {
            current = current.children()?.get(part)?;
        }
        Some(current)
    }
}
