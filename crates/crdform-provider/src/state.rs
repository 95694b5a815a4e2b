//! Resource instance state

use crdform_schema::{CrdScope, ResourceSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProviderError, Result};
use crate::import::format_id;
use crate::wait::WaitFor;

/// State of one resource instance
///
/// Bookkeeping attributes are typed fields; everything else is the domain
/// body, keyed by display name. `wait_for` is carried as written and only
/// decoded by [`ResourceState::wait_conditions`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub force_conflicts: Option<bool>,
    #[serde(default)]
    pub field_manager: Option<String>,
    #[serde(default)]
    pub wait_for: Option<Value>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ResourceState {
    pub fn from_value(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ProviderError::InvalidState(
                "resource state must be an object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decoded `wait_for` entries, with unset timeouts defaulted
    pub fn wait_conditions(&self) -> Result<Vec<WaitFor>> {
        match &self.wait_for {
            None => Ok(Vec::new()),
            Some(entries) => Ok(Vec::<WaitFor>::deserialize(entries)?),
        }
    }

    /// Domain body as a JSON object
    pub fn body_value(&self) -> Value {
        Value::Object(self.body.clone())
    }

    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.body
            .get("metadata")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_str("name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    /// Namespace and name of the object, as required by the resource scope
    pub fn coordinates(&self, scope: CrdScope) -> Result<(Option<String>, String)> {
        let name = self
            .name()
            .ok_or_else(|| ProviderError::InvalidState("metadata.name is not set".to_string()))?;
        let namespace = if scope.is_namespaced() {
            let namespace = self.namespace().ok_or_else(|| {
                ProviderError::InvalidState("metadata.namespace is not set".to_string())
            })?;
            Some(namespace.to_string())
        } else {
            None
        };
        Ok((namespace, name.to_string()))
    }

    /// The `id` implied by the object's coordinates
    pub fn compute_id(&self, scope: CrdScope) -> Result<String> {
        let (namespace, name) = self.coordinates(scope)?;
        Ok(format_id(namespace.as_deref(), &name))
    }

    /// Replace the domain body with values read back from the server
    pub fn replace_body(&mut self, body: Map<String, Value>) {
        self.body = body;
    }

    /// Fresh state for an imported object
    pub fn imported(schema: &ResourceSchema, namespace: Option<&str>, name: &str) -> Self {
        let mut metadata = Map::new();
        metadata.insert("name".to_string(), Value::String(name.to_string()));
        if let Some(ns) = namespace {
            metadata.insert("namespace".to_string(), Value::String(ns.to_string()));
        }

        let mut body = Map::new();
        for attribute in schema.domain_attributes() {
            body.insert(attribute.display_name.clone(), Value::Null);
        }
        body.insert("metadata".to_string(), Value::Object(metadata));

        Self {
            id: Some(format_id(namespace, name)),
            body,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bookkeeping_split() {
        let state = ResourceState::from_value(&json!({
            "id": null,
            "field_manager": "me",
            "wait_for": [{"jsonpath": "$.status.ready"}],
            "metadata": {"name": "web", "namespace": "default"},
            "spec": {"replicas": 2}
        }))
        .unwrap();

        assert_eq!(state.id, None);
        assert_eq!(state.force_conflicts, None);
        assert_eq!(state.field_manager.as_deref(), Some("me"));
        assert_eq!(state.wait_for, Some(json!([{"jsonpath": "$.status.ready"}])));
        assert_eq!(state.wait_conditions().unwrap()[0].timeout, "30s");
        assert_eq!(state.body.len(), 2);
        assert!(state.body.contains_key("spec"));

        let value = state.to_value().unwrap();
        assert_eq!(value["force_conflicts"], Value::Null);
        assert_eq!(value["spec"]["replicas"], 2);
    }

    #[test]
    fn test_wait_for_kept_verbatim() {
        let raw = json!({
            "wait_for": [
                {"jsonpath": "$.a"},
                {"jsonpath": "$.b", "value": null, "timeout": null},
                {"jsonpath": "$.c", "value": "ok", "timeout": "0s"}
            ],
            "metadata": {"name": "web", "namespace": "default"}
        });
        let state = ResourceState::from_value(&raw).unwrap();
        assert_eq!(state.to_value().unwrap()["wait_for"], raw["wait_for"]);

        let conditions = state.wait_conditions().unwrap();
        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0].timeout, "30s");
        assert_eq!(conditions[1].timeout, "30s");
        assert_eq!(conditions[2], WaitFor::new("$.c").with_value("ok").with_timeout("0s"));

        let empty = ResourceState::from_value(&json!({"wait_for": null})).unwrap();
        assert!(empty.wait_conditions().unwrap().is_empty());
    }

    #[test]
    fn test_compute_id() {
        let state = ResourceState::from_value(&json!({
            "metadata": {"name": "web", "namespace": "default"}
        }))
        .unwrap();
        assert_eq!(state.compute_id(CrdScope::Namespaced).unwrap(), "default/web");
        assert_eq!(state.compute_id(CrdScope::Cluster).unwrap(), "web");
    }

    #[test]
    fn test_missing_coordinates() {
        let state = ResourceState::from_value(&json!({"metadata": {"name": "web"}})).unwrap();
        assert!(matches!(
            state.compute_id(CrdScope::Namespaced),
            Err(ProviderError::InvalidState(_))
        ));

        assert!(ResourceState::from_value(&json!("nope")).is_err());
    }
}
