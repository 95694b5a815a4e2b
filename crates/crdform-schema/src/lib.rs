//! crdform schema - CRD OpenAPI documents as Terraform-style attribute trees
//!
//! This crate provides:
//! - **CRD parsing**: `CustomResourceDefinition` YAML/JSON into a typed [`CrdSchema`]
//! - **Schema building**: one [`ResourceSchema`] per CRD version, built bottom-up
//! - **Conversion**: state objects (display names) to and from manifests (wire names)
//! - **Validation**: required fields, types, and constraints inherited from OpenAPI

pub mod attribute;
mod builder;
mod convert;
pub mod crd;
pub mod error;
pub mod naming;
pub mod resource;
mod validate;
pub mod validator;

pub use attribute::{Attribute, AttributeType, Attributes, ScalarType};
pub use builder::SchemaBuilder;
pub use crd::{CrdParser, CrdSchema, CrdScope, GroupVersionResource};
pub use error::{Result, SchemaError};
pub use resource::{
    BOOKKEEPING_ATTRIBUTES, DEFAULT_WAIT_TIMEOUT, FIELD_MANAGER_ATTRIBUTE,
    FORCE_CONFLICTS_ATTRIBUTE, ID_ATTRIBUTE, ResourceSchema, WAIT_FOR_ATTRIBUTE,
};
pub use validate::ValidationIssue;
pub use validator::{Pattern, Validator};
