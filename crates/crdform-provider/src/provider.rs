//! Provider registry
//!
//! Holds one [`ResourceSchema`] per served CRD version and hands out
//! [`Resource`] drivers bound to the configured provider context.

use crdform_schema::{CrdParser, CrdSchema, ResourceSchema, SchemaBuilder};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::client::ResourceClient;
use crate::config::ProviderData;
use crate::error::{ProviderError, Result};
use crate::resource::Resource;

/// Default provider name, the prefix of every resource type name
pub const DEFAULT_PROVIDER_NAME: &str = "k8s";

/// Registry of resource types for one provider
pub struct Provider<C> {
    builder: SchemaBuilder,
    schemas: BTreeMap<String, Arc<ResourceSchema>>,
    data: ProviderData<C>,
}

impl<C: ResourceClient> Provider<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            builder: SchemaBuilder::new(name),
            schemas: BTreeMap::new(),
            data: ProviderData::Absent,
        }
    }

    /// Register every served version of a CRD, returning the new type names
    pub fn register_crd(&mut self, crd: &CrdSchema) -> Result<Vec<String>> {
        let mut registered = Vec::new();
        for schema in self.builder.build_served(crd)? {
            let type_name = schema.type_name.clone();
            if self
                .schemas
                .insert(type_name.clone(), Arc::new(schema))
                .is_some()
            {
                tracing::warn!(type_name = %type_name, crd = %crd.name, "replacing resource type");
            }
            registered.push(type_name);
        }
        tracing::debug!(crd = %crd.name, types = registered.len(), "registered CRD");
        Ok(registered)
    }

    /// Register every CRD found in a (possibly multi-document) YAML string
    pub fn load_crds(&mut self, yaml: &str) -> Result<Vec<String>> {
        let mut registered = Vec::new();
        for crd in CrdParser::parse_documents(yaml)? {
            registered.extend(self.register_crd(&crd)?);
        }
        Ok(registered)
    }

    /// Register every CRD found in a file
    pub fn load_crd_file(&mut self, path: &Path) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(path)?;
        let registered = self.load_crds(&content)?;
        if registered.is_empty() {
            tracing::warn!(path = %path.display(), "no served CRD versions found");
        }
        Ok(registered)
    }

    /// Type names of every registered resource, sorted
    pub fn metadata(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn schema(&self, type_name: &str) -> Option<&Arc<ResourceSchema>> {
        self.schemas.get(type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Store provider data for resources handed out afterwards
    pub fn configure(&mut self, data: ProviderData<C>) -> Result<()> {
        if let ProviderData::Malformed { type_name } = &data {
            return Err(ProviderError::Configuration {
                type_name: type_name.clone(),
            });
        }
        if let Some(context) = data.context() {
            tracing::info!(
                field_manager = context.field_manager(),
                force_conflicts = context.force_conflicts(),
                offline = context.is_offline(),
                "provider configured"
            );
        }
        self.data = data;
        Ok(())
    }

    /// CRUD driver for a registered type, configured with the provider data
    pub fn resource(&self, type_name: &str) -> Result<Resource<C>> {
        let schema = self
            .schema(type_name)
            .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))?;
        let mut resource = Resource::new(Arc::clone(schema));
        resource.configure(self.data.clone())?;
        Ok(resource)
    }
}

impl<C: ResourceClient> Default for Provider<C> {
    fn default() -> Self {
        Self::new(DEFAULT_PROVIDER_NAME)
    }
}
