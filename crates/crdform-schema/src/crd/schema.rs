//! Structured representation of a CustomResourceDefinition
//!
//! Only the parts of a CRD that drive attribute-tree construction and API
//! addressing are kept: group, scope, names, and per-version OpenAPI schemas.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A parsed CustomResourceDefinition
#[derive(Debug, Clone, PartialEq)]
pub struct CrdSchema {
    /// Full CRD name (e.g., "certificates.cert-manager.io")
    pub name: String,
    /// API group (e.g., "cert-manager.io")
    pub group: String,
    /// Resource scope
    pub scope: CrdScope,
    /// Resource names (kind, plural)
    pub names: CrdNames,
    /// API versions with their schemas
    pub versions: Vec<CrdVersionSchema>,
}

impl CrdSchema {
    /// Get all served versions
    pub fn served_versions(&self) -> impl Iterator<Item = &CrdVersionSchema> {
        self.versions.iter().filter(|v| v.served)
    }

    /// Look up a version by name
    pub fn version(&self, name: &str) -> Option<&CrdVersionSchema> {
        self.versions.iter().find(|v| v.name == name)
    }

    /// Address of this CRD's resources at the given version
    pub fn gvr(&self, version: &str) -> GroupVersionResource {
        GroupVersionResource {
            group: self.group.clone(),
            version: version.to_string(),
            resource: self.names.plural.clone(),
        }
    }
}

/// CRD scope - whether resources are namespaced or cluster-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CrdScope {
    #[default]
    Namespaced,
    Cluster,
}

impl CrdScope {
    pub fn is_namespaced(self) -> bool {
        matches!(self, Self::Namespaced)
    }
}

impl std::fmt::Display for CrdScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namespaced => write!(f, "Namespaced"),
            Self::Cluster => write!(f, "Cluster"),
        }
    }
}

/// CRD naming information
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CrdNames {
    /// Kind (e.g., "Certificate")
    pub kind: String,
    /// Plural name (e.g., "certificates"), the resource segment of the GVR
    pub plural: String,
}

/// A single API version of a CRD
#[derive(Debug, Clone, PartialEq)]
pub struct CrdVersionSchema {
    /// Version name (e.g., "v1", "v1beta1", "v1alpha1")
    pub name: String,
    /// Whether this version is served by the API server
    pub served: bool,
    /// Whether this version is deprecated
    pub deprecated: bool,
    /// Deprecation warning message
    pub deprecation_warning: Option<String>,
    /// OpenAPI v3 schema for validation
    pub schema: Option<OpenApiSchema>,
}

impl CrdVersionSchema {
    /// Warning to surface for a deprecated version, `None` otherwise
    pub fn deprecation(&self, crd: &CrdSchema) -> Option<String> {
        if !self.deprecated {
            return None;
        }
        Some(self.deprecation_warning.clone().unwrap_or_else(|| {
            format!(
                "{}/{} {} is deprecated",
                crd.group, self.name, crd.names.kind
            )
        }))
    }
}

/// Root OpenAPI v3 schema of one CRD version
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OpenApiSchema {
    pub description: Option<String>,
    /// Root properties (typically: apiVersion, kind, metadata, spec, status), sorted by name
    pub properties: BTreeMap<String, SchemaProperty>,
    /// Required field names at root level
    pub required: Vec<String>,
    /// Whether to preserve unknown fields
    pub x_preserve_unknown: bool,
}

impl OpenApiSchema {
    /// Check if a property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Schema for a single property
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaProperty {
    pub type_: PropertyType,
    pub description: Option<String>,
    pub default: Option<serde_json::Value>,
    /// Regex pattern for strings
    pub pattern: Option<String>,
    /// Allowed values (enum)
    pub enum_values: Option<Vec<serde_json::Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    /// Nested object properties, sorted by name
    pub properties: Option<BTreeMap<String, SchemaProperty>>,
    /// Required nested properties
    pub required: Option<Vec<String>>,
    /// Array item schema
    pub items: Option<Box<SchemaProperty>>,
    /// Additional properties for objects
    pub additional_properties: Option<AdditionalProperties>,
    /// x-kubernetes-preserve-unknown-fields
    pub x_preserve_unknown: bool,
    /// x-kubernetes-embedded-resource
    pub x_embedded_resource: bool,
    /// x-kubernetes-int-or-string
    pub x_int_or_string: bool,
}

impl SchemaProperty {
    /// Check if this property has nested properties
    pub fn has_nested_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Check if a nested property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|r| r.iter().any(|n| n == name))
    }
}

/// Property type in OpenAPI schema
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    #[default]
    Object,
    /// Unknown or unspecified type
    Unknown(String),
}

impl PropertyType {
    /// Parse from string representation
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array => write!(f, "array"),
            Self::Object => write!(f, "object"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Additional properties configuration for objects
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdditionalProperties {
    /// Additional properties are allowed (any type)
    #[default]
    Allowed,
    /// Additional properties are not allowed
    Denied,
    /// Additional properties must match a schema
    Schema(Box<SchemaProperty>),
}

/// The (group, version, plural resource) triple addressing a Kubernetes API resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    /// The `apiVersion` string for objects of this resource (`group/version`, or
    /// just `version` for the core group)
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl std::fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(name: &str, served: bool) -> CrdVersionSchema {
        CrdVersionSchema {
            name: name.to_string(),
            served,
            deprecated: false,
            deprecation_warning: None,
            schema: None,
        }
    }

    #[test]
    fn test_schema_property_required() {
        let mut nested = BTreeMap::new();
        nested.insert(
            "replicas".to_string(),
            SchemaProperty {
                type_: PropertyType::Integer,
                ..Default::default()
            },
        );
        nested.insert(
            "image".to_string(),
            SchemaProperty {
                type_: PropertyType::String,
                ..Default::default()
            },
        );

        let spec = SchemaProperty {
            properties: Some(nested),
            required: Some(vec!["replicas".to_string()]),
            ..Default::default()
        };

        assert!(spec.has_nested_properties());
        assert!(spec.is_required("replicas"));
        assert!(!spec.is_required("image"));
    }

    #[test]
    fn test_crd_schema_versions() {
        let schema = CrdSchema {
            name: "tests.example.com".to_string(),
            group: "example.com".to_string(),
            scope: CrdScope::Namespaced,
            names: CrdNames {
                kind: "Test".to_string(),
                plural: "tests".to_string(),
            },
            versions: vec![version("v1", true), version("v1alpha1", false)],
        };

        assert!(schema.version("v1").is_some());
        assert!(schema.version("v2").is_none());
        assert_eq!(schema.served_versions().count(), 1);

        let gvr = schema.gvr("v1");
        assert_eq!(gvr.resource, "tests");
        assert_eq!(gvr.api_version(), "example.com/v1");
        assert_eq!(gvr.to_string(), "example.com/v1/tests");
    }

    #[test]
    fn test_deprecation_message() {
        let crd = CrdSchema {
            name: "tests.example.com".to_string(),
            group: "example.com".to_string(),
            scope: CrdScope::Namespaced,
            names: CrdNames {
                kind: "Test".to_string(),
                plural: "tests".to_string(),
            },
            versions: Vec::new(),
        };

        let mut v1beta1 = version("v1beta1", true);
        assert_eq!(v1beta1.deprecation(&crd), None);

        v1beta1.deprecated = true;
        assert_eq!(
            v1beta1.deprecation(&crd).as_deref(),
            Some("example.com/v1beta1 Test is deprecated")
        );

        v1beta1.deprecation_warning = Some("use v1".to_string());
        assert_eq!(v1beta1.deprecation(&crd).as_deref(), Some("use v1"));
    }

    #[test]
    fn test_core_group_api_version() {
        let gvr = GroupVersionResource {
            group: String::new(),
            version: "v1".to_string(),
            resource: "configmaps".to_string(),
        };
        assert_eq!(gvr.api_version(), "v1");
    }

    #[test]
    fn test_crd_scope_display() {
        assert_eq!(CrdScope::Namespaced.to_string(), "Namespaced");
        assert_eq!(CrdScope::Cluster.to_string(), "Cluster");
        assert!(CrdScope::Namespaced.is_namespaced());
        assert!(!CrdScope::Cluster.is_namespaced());
    }
}
