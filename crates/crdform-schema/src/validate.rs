//! State validation and default filling against the attribute tree

use serde::Serialize;
use serde_json::Value;

use crate::attribute::{Attribute, AttributeType, Attributes};
use crate::convert::json_type;
use crate::resource::ResourceSchema;

/// One problem found while validating a state object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Display path of the attribute (e.g. `spec.issuer_ref.name`)
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl ResourceSchema {
    /// Check a state object against the tree
    ///
    /// Reports missing required attributes, values of the wrong type, and
    /// validator failures. An empty result means the state is valid.
    pub fn validate(&self, state: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        match state.as_object() {
            Some(_) => validate_object(&self.attributes, state, "", &mut issues),
            None => issues.push(ValidationIssue {
                path: "<root>".to_string(),
                message: format!("expected object, got {}", json_type(state)),
            }),
        }
        issues
    }

    /// Fill absent optional attributes that declare a default
    pub fn apply_defaults(&self, state: &mut Value) {
        fill_defaults(&self.attributes, state);
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn validate_object(
    attributes: &Attributes,
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(object) = value.as_object() else {
        issues.push(ValidationIssue {
            path: path.to_string(),
            message: format!("expected object, got {}", json_type(value)),
        });
        return;
    };

    for attribute in attributes.values() {
        let child_path = join(path, &attribute.display_name);
        match object.get(&attribute.display_name) {
            None | Some(Value::Null) => {
                if attribute.required {
                    issues.push(ValidationIssue {
                        path: child_path,
                        message: "required attribute is missing".to_string(),
                    });
                }
            }
            Some(child) => validate_value(attribute, child, &child_path, issues),
        }
    }
}

fn validate_value(
    attribute: &Attribute,
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    match &attribute.type_ {
        AttributeType::Scalar { scalar } if !scalar.accepts(value) => {
            issues.push(type_issue(path, &scalar.to_string(), value));
            return;
        }
        AttributeType::IntOrString if !(value.is_string() || value.is_i64()) => {
            issues.push(type_issue(path, "int_or_string", value));
            return;
        }
        AttributeType::Json => {
            if let Some(s) = value.as_str()
                && let Err(e) = serde_json::from_str::<Value>(s)
            {
                issues.push(ValidationIssue {
                    path: path.to_string(),
                    message: format!("invalid JSON: {}", e),
                });
                return;
            }
        }
        AttributeType::Map => match value.as_object() {
            Some(map) => {
                for (key, item) in map {
                    if !(item.is_string() || item.is_null()) {
                        issues.push(ValidationIssue {
                            path: format!("{}.{}", path, key),
                            message: format!("expected string, got {}", json_type(item)),
                        });
                    }
                }
            }
            None => {
                issues.push(type_issue(path, "map(string)", value));
                return;
            }
        },
        AttributeType::List { element } => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    if !element.accepts(item) {
                        issues.push(ValidationIssue {
                            path: format!("{}[{}]", path, i),
                            message: format!("expected {}, got {}", element, json_type(item)),
                        });
                    }
                }
            }
            None => {
                issues.push(type_issue(path, &attribute.type_.label(), value));
                return;
            }
        },
        AttributeType::Object { attributes } => {
            validate_object(attributes, value, path, issues);
        }
        AttributeType::ListNested { attributes } => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    validate_object(attributes, item, &format!("{}[{}]", path, i), issues);
                }
            }
            None => {
                issues.push(type_issue(path, "list(object)", value));
                return;
            }
        },
        _ => {}
    }

    for validator in &attribute.validators {
        if let Some(message) = validator.check(value) {
            issues.push(ValidationIssue {
                path: path.to_string(),
                message,
            });
        }
    }
}

fn type_issue(path: &str, expected: &str, value: &Value) -> ValidationIssue {
    ValidationIssue {
        path: path.to_string(),
        message: format!("expected {}, got {}", expected, json_type(value)),
    }
}

fn fill_defaults(attributes: &Attributes, value: &mut Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };

    for attribute in attributes.values() {
        let slot = object
            .entry(attribute.display_name.clone())
            .or_insert(Value::Null);

        if slot.is_null() {
            if let Some(default) = &attribute.default {
                *slot = default.clone();
            }
            continue;
        }

        match &attribute.type_ {
            AttributeType::Object { attributes } => fill_defaults(attributes, slot),
            AttributeType::ListNested { attributes } => {
                if let Some(items) = slot.as_array_mut() {
                    for item in items {
                        fill_defaults(attributes, item);
                    }
                }
            }
            _ => {}
        }
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

    fn valid_state() -> Value {
        json!({
            "metadata": {"name": "web", "namespace": "default"},
            "spec": {
                "secret_name": "web-tls",
                "issuer_ref": {"name": "letsencrypt"}
            }
        })
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn test_valid_state() {
        assert!(certificate().validate(&valid_state()).is_empty());
    }

    #[test]
    fn test_missing_required() {
        let state = json!({"metadata": {"name": "web"}, "spec": {"issuer_ref": {}}});
        let issues = certificate().validate(&state);
        assert_eq!(
            paths(&issues),
            vec![
                "metadata.namespace",
                "spec.issuer_ref.name",
                "spec.secret_name"
            ]
        );
    }

    #[test]
    fn test_validator_failures() {
        let mut state = valid_state();
        state["metadata"]["name"] = json!("");
        state["spec"]["duration"] = json!("1d");
        state["spec"]["revision_history_limit"] = json!(20);
        state["spec"]["issuer_ref"]["kind"] = json!("Nope");
        state["spec"]["dns_names"] = json!(["a", "b", "c", "d", "e", "f"]);

        let issues = certificate().validate(&state);
        assert_eq!(
            paths(&issues),
            vec![
                "metadata.name",
                "spec.dns_names",
                "spec.duration",
                "spec.issuer_ref.kind",
                "spec.revision_history_limit"
            ]
        );
    }

    #[test]
    fn test_type_mismatch_and_bad_json() {
        let mut state = valid_state();
        state["spec"]["is_ca"] = json!("yes");
        state["spec"]["private_key"] = json!("{");
        state["wait_for"] = json!([{"jsonpath": 1}]);

        let issues = certificate().validate(&state);
        assert_eq!(
            paths(&issues),
            vec!["wait_for[0].jsonpath", "spec.is_ca", "spec.private_key"]
        );
    }

    #[test]
    fn test_not_an_object() {
        let issues = certificate().validate(&json!([1, 2]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, "<root>");
    }

    #[test]
    fn test_apply_defaults() {
        let mut state = valid_state();
        state["wait_for"] = json!([{"jsonpath": "$.status.ready"}, {"jsonpath": "$.x", "timeout": "5m"}]);

        certificate().apply_defaults(&mut state);

        assert_eq!(state["wait_for"][0]["timeout"], "30s");
        assert_eq!(state["wait_for"][0]["value"], Value::Null);
        assert_eq!(state["wait_for"][1]["timeout"], "5m");
        assert_eq!(state["spec"]["is_ca"], false);
        assert_eq!(state["id"], Value::Null);
    }
}
