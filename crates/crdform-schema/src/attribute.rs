//! The resource attribute tree
//!
//! An [`Attribute`] is one node of the Terraform-facing schema. Each node knows
//! its Kubernetes wire name and its Terraform display name; the pair is fixed
//! when the tree is built and never changes afterwards.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::validator::Validator;

/// Child attributes of an object node, keyed by display name
pub type Attributes = IndexMap<String, Attribute>;

/// Scalar element type for primitive attributes and lists of primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Bool,
    Int64,
    Number,
}

impl ScalarType {
    /// Whether a JSON value is of this scalar type
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Int64 => value.is_i64(),
            Self::Number => value.is_number(),
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Bool => write!(f, "bool"),
            Self::Int64 => write!(f, "int64"),
            Self::Number => write!(f, "number"),
        }
    }
}

/// Shape of an attribute node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeType {
    /// A single primitive value
    Scalar { scalar: ScalarType },
    /// Integer-or-string; kept as a string in state
    IntOrString,
    /// Free-form JSON payload, kept as an encoded string in state
    Json,
    /// Map of string to string
    Map,
    /// List of primitives
    List { element: ScalarType },
    /// Nested object
    Object { attributes: Attributes },
    /// List of nested objects
    ListNested { attributes: Attributes },
}

impl AttributeType {
    pub fn string() -> Self {
        Self::Scalar {
            scalar: ScalarType::String,
        }
    }

    pub fn bool() -> Self {
        Self::Scalar {
            scalar: ScalarType::Bool,
        }
    }

    pub fn int64() -> Self {
        Self::Scalar {
            scalar: ScalarType::Int64,
        }
    }

    pub fn number() -> Self {
        Self::Scalar {
            scalar: ScalarType::Number,
        }
    }

    /// Children of an object or list-of-object node
    pub fn children(&self) -> Option<&Attributes> {
        match self {
            Self::Object { attributes } | Self::ListNested { attributes } => Some(attributes),
            _ => None,
        }
    }

    /// Short label used in listings and error messages
    pub fn label(&self) -> String {
        match self {
            Self::Scalar { scalar } => scalar.to_string(),
            Self::IntOrString => "int_or_string".to_string(),
            Self::Json => "json".to_string(),
            Self::Map => "map(string)".to_string(),
            Self::List { element } => format!("list({})", element),
            Self::Object { .. } => "object".to_string(),
            Self::ListNested { .. } => "list(object)".to_string(),
        }
    }
}

/// One node in the attribute tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// Field name in the Kubernetes manifest
    pub wire_name: String,
    /// Attribute name in the Terraform configuration
    pub display_name: String,
    #[serde(flatten)]
    pub type_: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing this attribute forces the resource to be replaced
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub requires_replace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    /// New optional attribute
    pub fn new(
        wire_name: impl Into<String>,
        display_name: impl Into<String>,
        type_: AttributeType,
    ) -> Self {
        Self {
            wire_name: wire_name.into(),
            display_name: display_name.into(),
            type_,
            required: false,
            optional: true,
            computed: false,
            requires_replace: false,
            default: None,
            description: None,
            validators: Vec::new(),
        }
    }

    /// New object attribute whose children are already built
    pub fn object(
        wire_name: impl Into<String>,
        display_name: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self::new(wire_name, display_name, AttributeType::Object { attributes })
    }

    /// New list-of-object attribute whose element children are already built
    pub fn list_nested(
        wire_name: impl Into<String>,
        display_name: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self::new(
            wire_name,
            display_name,
            AttributeType::ListNested { attributes },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self.computed = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self.optional = true;
        self
    }

    /// Value is set by the provider, never by configuration
    pub fn computed(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self
    }

    /// Value may come from configuration or be filled in by the provider
    pub fn optional_computed(mut self) -> Self {
        self.required = false;
        self.optional = true;
        self.computed = true;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    /// Set a default, which also makes the attribute optional and computed
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.optional_computed()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Only the provider writes this attribute
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// Children of an object or list-of-object node
    pub fn children(&self) -> Option<&Attributes> {
        self.type_.children()
    }
}

/// Insert an attribute keyed by its display name
///
/// Display names must stay unique per object level. A collision (e.g. both
/// `fooBar` and `foo_bar` on the wire) gets trailing underscores until unique.
pub fn insert_unique(attributes: &mut Attributes, mut attribute: Attribute) {
    while attributes.contains_key(&attribute.display_name) {
        tracing::warn!(
            wire_name = %attribute.wire_name,
            display_name = %attribute.display_name,
            "display name collision, appending underscore"
        );
        attribute.display_name.push('_');
    }
    attributes.insert(attribute.display_name.clone(), attribute);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flags() {
        let a = Attribute::new("name", "name", AttributeType::string()).required();
        assert!(a.required && !a.optional && !a.computed);

        let id = Attribute::new("id", "id", AttributeType::string()).computed();
        assert!(id.is_computed_only());

        let d = Attribute::new("timeout", "timeout", AttributeType::string())
            .with_default(json!("30s"));
        assert!(d.optional && d.computed && !d.is_computed_only());
    }

    #[test]
    fn test_insert_unique_keeps_bijection() {
        let mut attrs = Attributes::new();
        insert_unique(
            &mut attrs,
            Attribute::new("fooBar", "foo_bar", AttributeType::string()),
        );
        insert_unique(
            &mut attrs,
            Attribute::new("foo_bar", "foo_bar", AttributeType::string()),
        );

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs["foo_bar"].wire_name, "fooBar");
        assert_eq!(attrs["foo_bar_"].wire_name, "foo_bar");
    }

    #[test]
    fn test_scalar_accepts() {
        assert!(ScalarType::Int64.accepts(&json!(3)));
        assert!(!ScalarType::Int64.accepts(&json!(3.5)));
        assert!(ScalarType::Number.accepts(&json!(3.5)));
        assert!(!ScalarType::String.accepts(&json!(true)));
    }

    #[test]
    fn test_type_labels() {
        assert_eq!(AttributeType::string().label(), "string");
        assert_eq!(
            AttributeType::List {
                element: ScalarType::Int64
            }
            .label(),
            "list(int64)"
        );
        assert_eq!(AttributeType::Map.label(), "map(string)");
    }
}
