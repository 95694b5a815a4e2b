//! Import identifiers

use crdform_schema::CrdScope;

use crate::error::{ProviderError, Result};

/// Object coordinates decoded from an import id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportId {
    pub namespace: Option<String>,
    pub name: String,
}

impl ImportId {
    /// The `id` attribute value for these coordinates
    pub fn id(&self) -> String {
        format_id(self.namespace.as_deref(), &self.name)
    }
}

/// `namespace/name` for namespaced objects, plain `name` for cluster-scoped ones
pub fn format_id(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}/{}", ns, name),
        None => name.to_string(),
    }
}

/// Parse an import id for a resource of the given scope
pub fn parse_import_id(id: &str, scope: CrdScope) -> Result<ImportId> {
    let invalid = |reason: &str| ProviderError::Import {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = id.split('/').collect();
    match (scope, parts.as_slice()) {
        (CrdScope::Namespaced, [namespace, name]) if !namespace.is_empty() && !name.is_empty() => {
            Ok(ImportId {
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
            })
        }
        (CrdScope::Namespaced, _) => Err(invalid("expected 'namespace/name'")),
        (CrdScope::Cluster, [name]) if !name.is_empty() => Ok(ImportId {
            namespace: None,
            name: name.to_string(),
        }),
        (CrdScope::Cluster, _) => Err(invalid("expected 'name' for a cluster-scoped resource")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_import() {
        let id = parse_import_id("default/web", CrdScope::Namespaced).unwrap();
        assert_eq!(id.namespace.as_deref(), Some("default"));
        assert_eq!(id.name, "web");
        assert_eq!(id.id(), "default/web");
    }

    #[test]
    fn test_namespaced_import_rejects_malformed() {
        for bad in ["a", "a/b/c", "/b", "a/", "", "/"] {
            let err = parse_import_id(bad, CrdScope::Namespaced).unwrap_err();
            assert!(
                matches!(err, ProviderError::Import { ref id, .. } if id == bad),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_cluster_import() {
        let id = parse_import_id("letsencrypt", CrdScope::Cluster).unwrap();
        assert_eq!(id.namespace, None);
        assert_eq!(id.id(), "letsencrypt");

        assert!(parse_import_id("ns/letsencrypt", CrdScope::Cluster).is_err());
        assert!(parse_import_id("", CrdScope::Cluster).is_err());
    }
}
