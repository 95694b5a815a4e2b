//! Attribute-tree construction from CRD OpenAPI schemas
//!
//! Construction is strictly bottom-up: every child attribute is fully built
//! before the object (or list of objects) that holds it is created.

use serde_json::{Value, json};

use crate::attribute::{Attribute, AttributeType, Attributes, ScalarType, insert_unique};
use crate::crd::{AdditionalProperties, CrdSchema, CrdScope, PropertyType, SchemaProperty};
use crate::error::{Result, SchemaError};
use crate::naming;
use crate::resource::{
    DEFAULT_WAIT_TIMEOUT, FIELD_MANAGER_ATTRIBUTE, FORCE_CONFLICTS_ATTRIBUTE, ID_ATTRIBUTE,
    ResourceSchema, WAIT_FOR_ATTRIBUTE,
};
use crate::validator::{Pattern, Validator};

/// Root properties handled separately or owned by the server
const SKIPPED_ROOT_PROPERTIES: &[&str] = &["apiVersion", "kind", "metadata", "status"];

/// Builds [`ResourceSchema`]s for one provider
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    provider: String,
}

impl SchemaBuilder {
    /// Create a builder for resources named `<provider>_...`
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }

    /// Build the schema for one version of a CRD
    pub fn build(&self, crd: &CrdSchema, version: &str) -> Result<ResourceSchema> {
        let crd_version = crd
            .version(version)
            .ok_or_else(|| SchemaError::UnknownVersion {
                crd: crd.name.clone(),
                version: version.to_string(),
            })?;

        let mut attributes = Attributes::new();
        for attribute in bookkeeping_attributes() {
            insert_unique(&mut attributes, attribute);
        }
        insert_unique(&mut attributes, metadata_attribute(crd.scope));

        let description = match &crd_version.schema {
            Some(root) => {
                for (wire_name, prop) in &root.properties {
                    if SKIPPED_ROOT_PROPERTIES.contains(&wire_name.as_str()) {
                        continue;
                    }
                    let attribute = self.build_property(wire_name, prop, root.is_required(wire_name));
                    insert_unique(&mut attributes, attribute);
                }
                if root.x_preserve_unknown && !root.properties.contains_key("spec") {
                    insert_unique(&mut attributes, opaque_spec());
                }
                root.description.clone()
            }
            // Schemaless CRD versions still get a spec
            None => {
                insert_unique(&mut attributes, opaque_spec());
                None
            }
        };

        let deprecation = crd_version.deprecation(crd);
        if let Some(warning) = &deprecation {
            tracing::warn!(crd = %crd.name, version, warning = %warning, "deprecated CRD version");
        }

        tracing::debug!(
            crd = %crd.name,
            version,
            attributes = attributes.len(),
            "built resource schema"
        );

        Ok(ResourceSchema {
            type_name: naming::resource_type_name(
                &self.provider,
                &crd.group,
                &crd.names.kind,
                version,
            ),
            gvr: crd.gvr(version),
            kind: crd.names.kind.clone(),
            scope: crd.scope,
            description,
            deprecation,
            attributes,
        })
    }

    /// Build schemas for every served version of a CRD
    pub fn build_served(&self, crd: &CrdSchema) -> Result<Vec<ResourceSchema>> {
        crd.served_versions()
            .map(|v| self.build(crd, &v.name))
            .collect()
    }

    fn build_property(&self, wire_name: &str, prop: &SchemaProperty, required: bool) -> Attribute {
        let type_ = self.build_type(prop);
        let validators = validators_for(prop, &type_);

        let mut attribute = Attribute::new(wire_name, naming::display_name(wire_name), type_);
        attribute = if required {
            attribute.required()
        } else {
            attribute.optional()
        };

        if let Some(description) = &prop.description {
            attribute = attribute.with_description(description.clone());
        }

        if !required
            && let Some(default) = prop
                .default
                .as_ref()
                .and_then(|d| default_for(&attribute.type_, d))
        {
            attribute = attribute.with_default(default);
        }

        for validator in validators {
            attribute = attribute.with_validator(validator);
        }

        attribute
    }

    fn build_type(&self, prop: &SchemaProperty) -> AttributeType {
        if prop.x_int_or_string {
            return AttributeType::IntOrString;
        }
        if prop.x_preserve_unknown || prop.x_embedded_resource {
            return AttributeType::Json;
        }

        match &prop.type_ {
            PropertyType::String => AttributeType::string(),
            PropertyType::Boolean => AttributeType::bool(),
            PropertyType::Integer => AttributeType::int64(),
            PropertyType::Number => AttributeType::number(),
            PropertyType::Array => match prop.items.as_deref().map(|items| self.build_type(items)) {
                Some(AttributeType::Scalar { scalar }) => AttributeType::List { element: scalar },
                Some(AttributeType::Object { attributes }) => {
                    AttributeType::ListNested { attributes }
                }
                _ => AttributeType::Json,
            },
            PropertyType::Object if prop.has_nested_properties() => AttributeType::Object {
                attributes: self.build_children(prop),
            },
            PropertyType::Object => match &prop.additional_properties {
                Some(AdditionalProperties::Schema(value))
                    if value.type_ == PropertyType::String && !value.x_int_or_string =>
                {
                    AttributeType::Map
                }
                _ => AttributeType::Json,
            },
            PropertyType::Unknown(_) => AttributeType::Json,
        }
    }

    fn build_children(&self, prop: &SchemaProperty) -> Attributes {
        let mut children = Attributes::new();
        if let Some(properties) = &prop.properties {
            for (wire_name, child) in properties {
                let attribute = self.build_property(wire_name, child, prop.is_required(wire_name));
                insert_unique(&mut children, attribute);
            }
        }
        children
    }
}

fn opaque_spec() -> Attribute {
    Attribute::new("spec", "spec", AttributeType::Json)
        .with_description("Object spec as a JSON-encoded string.")
}

fn bookkeeping_attributes() -> Vec<Attribute> {
    let mut wait_for = Attributes::new();
    insert_unique(
        &mut wait_for,
        Attribute::new("jsonpath", "jsonpath", AttributeType::string())
            .required()
            .with_validator(Validator::NonEmpty)
            .with_description("Absolute path to a property of the resource, in JSONPath syntax."),
    );
    insert_unique(
        &mut wait_for,
        Attribute::new("value", "value", AttributeType::string())
            .with_description("Expected value of the property. Any value is accepted when unset."),
    );
    insert_unique(
        &mut wait_for,
        Attribute::new("timeout", "timeout", AttributeType::string())
            .with_default(json!(DEFAULT_WAIT_TIMEOUT))
            .with_description(
                "How long to wait. Zero checks once without waiting, negative waits up to a week.",
            ),
    );

    vec![
        Attribute::new(ID_ATTRIBUTE, ID_ATTRIBUTE, AttributeType::string())
            .computed()
            .with_description("Identifier of the form 'namespace/name'."),
        Attribute::new(
            FORCE_CONFLICTS_ATTRIBUTE,
            FORCE_CONFLICTS_ATTRIBUTE,
            AttributeType::bool(),
        )
        .with_description("Force server-side apply through field ownership conflicts."),
        Attribute::new(
            FIELD_MANAGER_ATTRIBUTE,
            FIELD_MANAGER_ATTRIBUTE,
            AttributeType::string(),
        )
        .with_description("Field manager name used for server-side apply."),
        Attribute::list_nested(WAIT_FOR_ATTRIBUTE, WAIT_FOR_ATTRIBUTE, wait_for)
            .with_description("Conditions to wait for after create or update."),
    ]
}

fn metadata_attribute(scope: CrdScope) -> Attribute {
    let mut children = Attributes::new();
    insert_unique(
        &mut children,
        Attribute::new("name", "name", AttributeType::string())
            .required()
            .requires_replace()
            .with_validator(Validator::NonEmpty)
            .with_description("Unique name of the object within its namespace."),
    );
    if scope.is_namespaced() {
        insert_unique(
            &mut children,
            Attribute::new("namespace", "namespace", AttributeType::string())
                .required()
                .requires_replace()
                .with_validator(Validator::NonEmpty)
                .with_description("Namespace the object lives in."),
        );
    }
    insert_unique(
        &mut children,
        Attribute::new("labels", "labels", AttributeType::Map),
    );
    insert_unique(
        &mut children,
        Attribute::new("annotations", "annotations", AttributeType::Map),
    );

    Attribute::object("metadata", "metadata", children).required()
}

fn validators_for(prop: &SchemaProperty, type_: &AttributeType) -> Vec<Validator> {
    let mut validators = Vec::new();

    match type_ {
        AttributeType::Scalar { scalar } => {
            if let Some(values) = &prop.enum_values {
                let values: Vec<Value> = values
                    .iter()
                    .filter(|v| scalar.accepts(v))
                    .cloned()
                    .collect();
                if !values.is_empty() {
                    validators.push(Validator::OneOf { values });
                }
            }

            match scalar {
                ScalarType::String => {
                    match (prop.min_length, prop.max_length) {
                        (None, None) => {}
                        (Some(1), None) => validators.push(Validator::NonEmpty),
                        (min, max) => validators.push(Validator::LengthBetween { min, max }),
                    }
                    if let Some(pattern) = &prop.pattern {
                        match Pattern::new(pattern) {
                            Ok(pattern) => validators.push(Validator::Regex { pattern }),
                            Err(e) => {
                                tracing::warn!(pattern = %pattern, error = %e, "dropping pattern that does not compile");
                            }
                        }
                    }
                }
                ScalarType::Int64 if prop.minimum.is_some() || prop.maximum.is_some() => {
                    validators.push(Validator::IntBetween {
                        min: prop.minimum.map(|m| m.ceil() as i64),
                        max: prop.maximum.map(|m| m.floor() as i64),
                    });
                }
                ScalarType::Number if prop.minimum.is_some() || prop.maximum.is_some() => {
                    validators.push(Validator::NumberBetween {
                        min: prop.minimum,
                        max: prop.maximum,
                    });
                }
                _ => {}
            }
        }
        AttributeType::List { .. } | AttributeType::ListNested { .. }
            if prop.min_items.is_some() || prop.max_items.is_some() =>
        {
            validators.push(Validator::ItemCount {
                min: prop.min_items,
                max: prop.max_items,
            });
        }
        _ => {}
    }

    validators
}

/// Translate an OpenAPI default into the state representation of the attribute
fn default_for(type_: &AttributeType, default: &Value) -> Option<Value> {
    match type_ {
        AttributeType::Scalar { scalar } if scalar.accepts(default) => Some(default.clone()),
        AttributeType::IntOrString => match default {
            Value::String(_) => Some(default.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            _ => None,
        },
        AttributeType::Json => serde_json::to_string(default).ok().map(Value::String),
        AttributeType::Map if default.is_object() => Some(default.clone()),
        AttributeType::List { element } => match default {
            Value::Array(items) if items.iter().all(|i| element.accepts(i)) => {
                Some(default.clone())
            }
            _ => None,
        },
        _ => None,
    }
}
