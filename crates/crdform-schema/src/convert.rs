//! Translation between state (display names) and manifests (wire names)

use serde_json::{Map, Value};

use crate::attribute::{Attribute, AttributeType, Attributes};
use crate::error::{Result, SchemaError};
use crate::resource::ResourceSchema;

impl ResourceSchema {
    /// Build the Kubernetes manifest for a state object
    ///
    /// Bookkeeping and computed-only attributes are skipped, nulls are dropped,
    /// and `apiVersion` / `kind` are always set from the schema.
    pub fn to_manifest(&self, state: &Value) -> Result<Value> {
        let state = expect_object(state, "")?;

        let mut manifest = Map::new();
        manifest.insert("apiVersion".to_string(), Value::String(self.api_version()));
        manifest.insert("kind".to_string(), Value::String(self.kind.clone()));

        for attribute in self.domain_attributes() {
            if attribute.is_computed_only() {
                continue;
            }
            let Some(value) = state.get(&attribute.display_name) else {
                continue;
            };
            if let Some(wire) = value_to_wire(attribute, value, &attribute.display_name)? {
                manifest.insert(attribute.wire_name.clone(), wire);
            }
        }

        Ok(Value::Object(manifest))
    }

    /// Read the domain attributes of a manifest into a state object
    ///
    /// Every domain attribute is present in the result (null when absent from
    /// the manifest). Fields the schema does not know about are dropped.
    pub fn from_manifest(&self, manifest: &Value) -> Result<Map<String, Value>> {
        let manifest = expect_object(manifest, "")?;
        let mut state = Map::new();
        for attribute in self.domain_attributes() {
            let value = match manifest.get(&attribute.wire_name) {
                Some(wire) => value_from_wire(attribute, wire, &attribute.display_name)?,
                None => Value::Null,
            };
            state.insert(attribute.display_name.clone(), value);
        }
        Ok(state)
    }
}

fn value_to_wire(attribute: &Attribute, value: &Value, path: &str) -> Result<Option<Value>> {
    if value.is_null() {
        return Ok(None);
    }

    let wire = match &attribute.type_ {
        AttributeType::Scalar { scalar } => {
            if !scalar.accepts(value) {
                return Err(mismatch(path, &scalar.to_string(), value));
            }
            value.clone()
        }
        AttributeType::IntOrString => match value {
            // Only canonical integers travel as numbers
            Value::String(s) => match s.parse::<i64>() {
                Ok(n) if n.to_string() == *s => Value::from(n),
                _ => value.clone(),
            },
            Value::Number(_) => value.clone(),
            other => return Err(mismatch(path, "int_or_string", other)),
        },
        AttributeType::Json => match value {
            Value::String(s) => {
                serde_json::from_str(s).map_err(|e| SchemaError::InvalidJson {
                    path: path.to_string(),
                    message: e.to_string(),
                })?
            }
            other => other.clone(),
        },
        AttributeType::Map => {
            let map = expect_object(value, path)?;
            let mut out = Map::new();
            for (key, item) in map {
                match item {
                    Value::Null => {}
                    Value::String(_) => {
                        out.insert(key.clone(), item.clone());
                    }
                    other => return Err(mismatch(&format!("{}.{}", path, key), "string", other)),
                }
            }
            Value::Object(out)
        }
        AttributeType::List { element } => {
            let items = expect_array(value, path)?;
            for (i, item) in items.iter().enumerate() {
                if !element.accepts(item) {
                    return Err(mismatch(&format!("{}[{}]", path, i), &element.to_string(), item));
                }
            }
            value.clone()
        }
        AttributeType::Object { attributes } => object_to_wire(attributes, value, path)?,
        AttributeType::ListNested { attributes } => {
            let items = expect_array(value, path)?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(object_to_wire(attributes, item, &format!("{}[{}]", path, i))?);
            }
            Value::Array(out)
        }
    };

    Ok(Some(wire))
}

fn object_to_wire(attributes: &Attributes, value: &Value, path: &str) -> Result<Value> {
    let object = expect_object(value, path)?;
    let mut out = Map::new();
    for attribute in attributes.values() {
        if attribute.is_computed_only() {
            continue;
        }
        let Some(child) = object.get(&attribute.display_name) else {
            continue;
        };
        let child_path = format!("{}.{}", path, attribute.display_name);
        if let Some(wire) = value_to_wire(attribute, child, &child_path)? {
            out.insert(attribute.wire_name.clone(), wire);
        }
    }
    Ok(Value::Object(out))
}

fn value_from_wire(attribute: &Attribute, wire: &Value, path: &str) -> Result<Value> {
    if wire.is_null() {
        return Ok(Value::Null);
    }

    let value = match &attribute.type_ {
        AttributeType::Scalar { scalar } => {
            if !scalar.accepts(wire) {
                return Err(mismatch(path, &scalar.to_string(), wire));
            }
            wire.clone()
        }
        AttributeType::IntOrString => match wire {
            Value::String(_) => wire.clone(),
            Value::Number(n) => Value::String(n.to_string()),
            other => return Err(mismatch(path, "int_or_string", other)),
        },
        AttributeType::Json => Value::String(serde_json::to_string(wire)?),
        AttributeType::Map => {
            expect_object(wire, path)?;
            wire.clone()
        }
        AttributeType::List { .. } => {
            expect_array(wire, path)?;
            wire.clone()
        }
        AttributeType::Object { attributes } => object_from_wire(attributes, wire, path)?,
        AttributeType::ListNested { attributes } => {
            let items = expect_array(wire, path)?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(object_from_wire(attributes, item, &format!("{}[{}]", path, i))?);
            }
            Value::Array(out)
        }
    };

    Ok(value)
}

fn object_from_wire(attributes: &Attributes, wire: &Value, path: &str) -> Result<Value> {
    let object = expect_object(wire, path)?;
    let mut out = Map::new();
    for attribute in attributes.values() {
        let child_path = format!("{}.{}", path, attribute.display_name);
        let value = match object.get(&attribute.wire_name) {
            Some(child) => value_from_wire(attribute, child, &child_path)?,
            None => Value::Null,
        };
        out.insert(attribute.display_name.clone(), value);
    }
    Ok(Value::Object(out))
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| mismatch(path, "object", value))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| mismatch(path, "list", value))
}

fn mismatch(path: &str, expected: &str, found: &Value) -> SchemaError {
    SchemaError::TypeMismatch {
        path: if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        },
        expected: expected.to_string(),
        found: json_type(found).to_string(),
    }
}

/// JSON type name of a value, for error messages
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::CERTIFICATE_CRD;
    use crate::{CrdParser, SchemaBuilder};
    use serde_json::json;

    fn certificate() -> ResourceSchema {
        let crd = CrdParser::parse(CERTIFICATE_CRD).unwrap();
        SchemaBuilder::new("k8s").build(&crd, "v1").unwrap()
    }

    fn state() -> Value {
        json!({
            "id": "default/web",
            "force_conflicts": true,
            "field_manager": "me",
            "wait_for": [{"jsonpath": "$.status.ready", "value": "true", "timeout": "30s"}],
            "metadata": {
                "name": "web",
                "namespace": "default",
                "labels": {"app": "web"},
                "annotations": null
            },
            "spec": {
                "secret_name": "web-tls",
                "is_ca": null,
                "dns_names": ["web.example.com"],
                "issuer_ref": {"name": "letsencrypt", "kind": "ClusterIssuer"},
                "private_key": "{\"algorithm\":\"ECDSA\"}",
                "port": "8443",
                "keystores": [{"type": "jks", "count_": 2}]
            }
        })
    }

    #[test]
    fn test_to_manifest_shape() {
        let manifest = certificate().to_manifest(&state()).unwrap();

        assert_eq!(manifest["apiVersion"], "cert-manager.io/v1");
        assert_eq!(manifest["kind"], "Certificate");
        assert_eq!(manifest["metadata"]["name"], "web");
        assert_eq!(manifest["metadata"]["namespace"], "default");
        assert!(manifest["metadata"].get("annotations").is_none());

        let spec = &manifest["spec"];
        assert_eq!(spec["secretName"], "web-tls");
        assert!(spec.get("isCA").is_none());
        assert_eq!(spec["issuerRef"]["kind"], "ClusterIssuer");
        assert_eq!(spec["privateKey"], json!({"algorithm": "ECDSA"}));
        assert_eq!(spec["port"], json!(8443));
        assert_eq!(spec["keystores"][0]["count"], json!(2));
    }

    #[test]
    fn test_to_manifest_omits_bookkeeping() {
        let manifest = certificate().to_manifest(&state()).unwrap();
        for key in ["id", "force_conflicts", "field_manager", "wait_for"] {
            assert!(manifest.get(key).is_none(), "{} leaked into manifest", key);
        }
    }

    #[test]
    fn test_to_manifest_overrides_api_version_and_kind() {
        let mut state = state();
        state["api_version"] = json!("evil/v9");
        state["kind"] = json!("Other");
        let manifest = certificate().to_manifest(&state).unwrap();
        assert_eq!(manifest["apiVersion"], "cert-manager.io/v1");
        assert_eq!(manifest["kind"], "Certificate");
    }

    #[test]
    fn test_to_manifest_type_mismatch() {
        let mut state = state();
        state["spec"]["dns_names"] = json!(["ok", 3]);
        let err = certificate().to_manifest(&state).unwrap_err();
        match err {
            SchemaError::TypeMismatch { path, .. } => assert_eq!(path, "spec.dns_names[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_to_manifest_invalid_json() {
        let mut state = state();
        state["spec"]["private_key"] = json!("{not json");
        let err = certificate().to_manifest(&state).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidJson { .. }));
    }

    #[test]
    fn test_from_manifest() {
        let manifest = json!({
            "apiVersion": "cert-manager.io/v1",
            "kind": "Certificate",
            "metadata": {
                "name": "web",
                "namespace": "default",
                "uid": "1234",
                "resourceVersion": "42"
            },
            "spec": {
                "secretName": "web-tls",
                "isCA": true,
                "port": 443,
                "privateKey": {"size": 256},
                "unknownField": "x"
            },
            "status": {"ready": true}
        });

        let state = certificate().from_manifest(&manifest).unwrap();

        assert!(state.get("status").is_none());
        assert!(state.get("id").is_none());
        assert_eq!(state["metadata"]["name"], "web");
        assert!(state["metadata"].get("uid").is_none());
        assert_eq!(state["metadata"]["labels"], Value::Null);

        let spec = &state["spec"];
        assert_eq!(spec["secret_name"], "web-tls");
        assert_eq!(spec["is_ca"], true);
        assert_eq!(spec["port"], "443");
        assert_eq!(spec["private_key"], "{\"size\":256}");
        assert_eq!(spec["dns_names"], Value::Null);
        assert!(spec.get("unknownField").is_none());
    }

    #[test]
    fn test_manifest_round_trip_preserves_domain_fields() {
        let schema = certificate();
        let manifest = schema.to_manifest(&state()).unwrap();
        let back = schema.from_manifest(&manifest).unwrap();

        assert_eq!(back["spec"]["secret_name"], "web-tls");
        assert_eq!(back["spec"]["issuer_ref"]["name"], "letsencrypt");
        assert_eq!(back["spec"]["keystores"][0]["count_"], 2);
        assert_eq!(back["metadata"]["labels"]["app"], "web");
    }

    #[test]
    fn test_int_or_string_keeps_non_canonical_strings() {
        let schema = certificate();
        for (planned, wire) in [
            ("8443", json!(8443)),
            ("-5", json!(-5)),
            ("0123", json!("0123")),
            ("+5", json!("+5")),
            ("-0", json!("-0")),
            ("25%", json!("25%")),
        ] {
            let mut state = state();
            state["spec"]["port"] = json!(planned);
            let manifest = schema.to_manifest(&state).unwrap();
            assert_eq!(manifest["spec"]["port"], wire, "wire form of {}", planned);

            let back = schema.from_manifest(&manifest).unwrap();
            assert_eq!(back["spec"]["port"], planned);
        }
    }
}
