//! CRD YAML parser
//!
//! Parses CustomResourceDefinition manifests into structured [`CrdSchema`]
//! values that the attribute-tree builder consumes.

use serde::Deserialize;
use serde_json::Value;

use super::schema::{
    AdditionalProperties, CrdNames, CrdSchema, CrdScope, CrdVersionSchema, OpenApiSchema,
    PropertyType, SchemaProperty,
};
use crate::error::{Result, SchemaError};

/// Parser for CRD YAML manifests
pub struct CrdParser;

impl CrdParser {
    /// Parse a single CRD YAML manifest
    pub fn parse(yaml: &str) -> Result<CrdSchema> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| SchemaError::Parse(format!("Invalid CRD YAML: {}", e)))?;

        Self::parse_value(&value)
    }

    /// Parse every CRD in a multi-document YAML stream
    ///
    /// Documents that are empty or are not CustomResourceDefinitions are skipped.
    pub fn parse_documents(yaml: &str) -> Result<Vec<CrdSchema>> {
        let mut crds = Vec::new();

        for (index, document) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
            let value = Value::deserialize(document).map_err(|e| {
                SchemaError::Parse(format!("Invalid YAML in document {}: {}", index, e))
            })?;

            if value.is_null() {
                continue;
            }

            if value.get("kind").and_then(Value::as_str) != Some("CustomResourceDefinition") {
                tracing::debug!(document = index, "skipping non-CRD document");
                continue;
            }

            crds.push(Self::parse_value(&value)?);
        }

        Ok(crds)
    }

    /// Parse from a serde_json::Value (useful for dynamic objects)
    pub fn parse_value(value: &Value) -> Result<CrdSchema> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidCrd("Missing 'kind' field".to_string()))?;

        if kind != "CustomResourceDefinition" {
            return Err(SchemaError::InvalidCrd(format!(
                "Expected CustomResourceDefinition, got {}",
                kind
            )));
        }

        let name = value
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidCrd("Missing 'metadata.name' field".to_string()))?
            .to_string();

        let spec = value
            .get("spec")
            .ok_or_else(|| SchemaError::InvalidCrd("Missing 'spec' field".to_string()))?;

        let group = spec
            .get("group")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidCrd("Missing 'spec.group' field".to_string()))?
            .to_string();

        let scope = match spec.get("scope").and_then(Value::as_str) {
            Some("Cluster") => CrdScope::Cluster,
            _ => CrdScope::Namespaced,
        };

        let names = Self::parse_names(spec.get("names"))?;
        let versions = Self::parse_versions(spec.get("versions"))?;

        Ok(CrdSchema {
            name,
            group,
            scope,
            names,
            versions,
        })
    }

    fn parse_names(names_value: Option<&Value>) -> Result<CrdNames> {
        let names = names_value
            .ok_or_else(|| SchemaError::InvalidCrd("Missing 'spec.names' field".to_string()))?;

        let kind = names
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidCrd("Missing 'spec.names.kind' field".to_string()))?
            .to_string();

        let plural = names
            .get("plural")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SchemaError::InvalidCrd("Missing 'spec.names.plural' field".to_string())
            })?
            .to_string();

        Ok(CrdNames { kind, plural })
    }

    fn parse_versions(versions_value: Option<&Value>) -> Result<Vec<CrdVersionSchema>> {
        let versions = versions_value
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaError::InvalidCrd("Missing 'spec.versions' array".to_string()))?;

        versions.iter().map(Self::parse_version).collect()
    }

    fn parse_version(version: &Value) -> Result<CrdVersionSchema> {
        let name = version
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidCrd("Version missing 'name' field".to_string()))?
            .to_string();

        let schema = version
            .get("schema")
            .and_then(|s| s.get("openAPIV3Schema"))
            .map(Self::parse_openapi_schema);

        Ok(CrdVersionSchema {
            name,
            served: version
                .get("served")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            deprecated: version
                .get("deprecated")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            deprecation_warning: version
                .get("deprecationWarning")
                .and_then(Value::as_str)
                .map(String::from),
            schema,
        })
    }

    fn parse_openapi_schema(schema: &Value) -> OpenApiSchema {
        OpenApiSchema {
            description: schema
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            properties: Self::parse_properties(schema).unwrap_or_default(),
            required: string_list(schema.get("required")).unwrap_or_default(),
            x_preserve_unknown: flag(schema, "x-kubernetes-preserve-unknown-fields"),
        }
    }

    fn parse_properties(
        schema: &Value,
    ) -> Option<std::collections::BTreeMap<String, SchemaProperty>> {
        schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.clone(), Self::parse_schema_property(v)))
                    .collect()
            })
    }

    /// Parse a single schema property (recursive)
    fn parse_schema_property(prop: &Value) -> SchemaProperty {
        let type_ = prop
            .get("type")
            .and_then(Value::as_str)
            .map(PropertyType::parse)
            .unwrap_or_default();

        let additional_properties = prop.get("additionalProperties").map(|v| match v {
            Value::Bool(true) => AdditionalProperties::Allowed,
            Value::Bool(false) => AdditionalProperties::Denied,
            other => AdditionalProperties::Schema(Box::new(Self::parse_schema_property(other))),
        });

        SchemaProperty {
            type_,
            description: prop
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            default: prop.get("default").cloned(),
            pattern: prop
                .get("pattern")
                .and_then(Value::as_str)
                .map(String::from),
            enum_values: prop.get("enum").and_then(Value::as_array).cloned(),
            minimum: prop.get("minimum").and_then(Value::as_f64),
            maximum: prop.get("maximum").and_then(Value::as_f64),
            min_length: prop.get("minLength").and_then(Value::as_u64),
            max_length: prop.get("maxLength").and_then(Value::as_u64),
            min_items: prop.get("minItems").and_then(Value::as_u64),
            max_items: prop.get("maxItems").and_then(Value::as_u64),
            properties: Self::parse_properties(prop),
            required: string_list(prop.get("required")),
            items: prop
                .get("items")
                .map(|v| Box::new(Self::parse_schema_property(v))),
            additional_properties,
            x_preserve_unknown: flag(prop, "x-kubernetes-preserve-unknown-fields"),
            x_embedded_resource: flag(prop, "x-kubernetes-embedded-resource"),
            x_int_or_string: flag(prop, "x-kubernetes-int-or-string"),
        }
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value.and_then(Value::as_array).map(|arr| {
        arr.iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect()
    })
}

fn flag(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: certificates.cert-manager.io
spec:
  group: cert-manager.io
  scope: Namespaced
  names:
    kind: Certificate
    plural: certificates
    singular: certificate
    shortNames:
      - cert
      - certs
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          required:
            - spec
          properties:
            spec:
              type: object
              required:
                - secretName
                - issuerRef
              properties:
                secretName:
                  type: string
                  minLength: 1
                duration:
                  type: string
                  pattern: "^[0-9]+h$"
                dnsNames:
                  type: array
                  items:
                    type: string
                issuerRef:
                  type: object
                  properties:
                    name:
                      type: string
                    kind:
                      type: string
                      enum: ["Issuer", "ClusterIssuer"]
                secretTemplate:
                  type: object
                  properties:
                    labels:
                      type: object
                      additionalProperties:
                        type: string
                port:
                  x-kubernetes-int-or-string: true
            status:
              type: object
              x-kubernetes-preserve-unknown-fields: true
    - name: v1alpha2
      served: false
      storage: false
      deprecated: true
      deprecationWarning: "use v1"
"#;

    #[test]
    fn test_parse_basic_crd() {
        let crd = CrdParser::parse(SAMPLE_CRD).unwrap();

        assert_eq!(crd.name, "certificates.cert-manager.io");
        assert_eq!(crd.group, "cert-manager.io");
        assert_eq!(crd.scope, CrdScope::Namespaced);
        assert_eq!(crd.names.kind, "Certificate");
        assert_eq!(crd.names.plural, "certificates");
        assert_eq!(crd.versions.len(), 2);
    }

    #[test]
    fn test_parse_version_flags() {
        let crd = CrdParser::parse(SAMPLE_CRD).unwrap();

        let v1 = crd.version("v1").unwrap();
        assert!(v1.served && !v1.deprecated);

        let old = crd.version("v1alpha2").unwrap();
        assert!(!old.served);
        assert!(old.deprecated);
        assert_eq!(old.deprecation_warning.as_deref(), Some("use v1"));
        assert!(old.schema.is_none());
    }

    #[test]
    fn test_parse_nested_properties() {
        let crd = CrdParser::parse(SAMPLE_CRD).unwrap();
        let root = crd.version("v1").unwrap().schema.as_ref().unwrap();
        assert!(root.is_required("spec"));
        assert!(root.properties["status"].x_preserve_unknown);

        assert!(!root.x_preserve_unknown);

        let spec = &root.properties["spec"];
        assert!(spec.is_required("secretName"));
        assert!(spec.is_required("issuerRef"));

        let props = spec.properties.as_ref().unwrap();
        assert_eq!(props["secretName"].min_length, Some(1));
        assert_eq!(props["duration"].pattern.as_deref(), Some("^[0-9]+h$"));
        assert_eq!(props["dnsNames"].type_, PropertyType::Array);
        assert_eq!(
            props["dnsNames"].items.as_ref().unwrap().type_,
            PropertyType::String
        );
        assert!(props["port"].x_int_or_string);

        let kind = &props["issuerRef"].properties.as_ref().unwrap()["kind"];
        assert_eq!(kind.enum_values.as_ref().unwrap().len(), 2);

        let labels = &props["secretTemplate"].properties.as_ref().unwrap()["labels"];
        match labels.additional_properties.as_ref().unwrap() {
            AdditionalProperties::Schema(inner) => assert_eq!(inner.type_, PropertyType::String),
            other => panic!("unexpected additionalProperties: {:?}", other),
        }
    }

    #[test]
    fn test_properties_sorted_by_name() {
        let crd = CrdParser::parse(SAMPLE_CRD).unwrap();
        let root = crd.version("v1").unwrap().schema.as_ref().unwrap();
        let spec = root.properties["spec"].properties.as_ref().unwrap();
        let names: Vec<&str> = spec.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["dnsNames", "duration", "issuerRef", "port", "secretName", "secretTemplate"]
        );
    }

    #[test]
    fn test_parse_cluster_scope() {
        let yaml = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: clusterissuers.cert-manager.io
spec:
  group: cert-manager.io
  scope: Cluster
  names:
    kind: ClusterIssuer
    plural: clusterissuers
  versions:
    - name: v1
      served: true
      storage: true
"#;
        let crd = CrdParser::parse(yaml).unwrap();
        assert_eq!(crd.scope, CrdScope::Cluster);
    }

    #[test]
    fn test_parse_rejects_non_crd() {
        let yaml = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: test
"#;
        let err = CrdParser::parse(yaml).unwrap_err();
        assert!(err.to_string().contains("Expected CustomResourceDefinition"));
    }

    #[test]
    fn test_parse_missing_names() {
        let yaml = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: things.example.com
spec:
  group: example.com
  versions: []
"#;
        let err = CrdParser::parse(yaml).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidCrd(_)));
    }

    #[test]
    fn test_parse_documents_skips_other_kinds() {
        let stream = format!(
            "{}\n---\napiVersion: v1\nkind: Namespace\nmetadata:\n  name: x\n---\n",
            SAMPLE_CRD
        );
        let crds = CrdParser::parse_documents(&stream).unwrap();
        assert_eq!(crds.len(), 1);
        assert_eq!(crds[0].names.kind, "Certificate");
    }
}
