//! CustomResourceDefinition handling
//!
//! - **Schema representation** (`schema`): structured types for CRDs and their
//!   OpenAPI v3 schemas
//! - **Parsing** (`parser`): CRD YAML into schema structures

mod parser;
mod schema;

pub use parser::CrdParser;
pub use schema::{
    AdditionalProperties, CrdNames, CrdSchema, CrdScope, CrdVersionSchema, GroupVersionResource,
    OpenApiSchema, PropertyType, SchemaProperty,
};
