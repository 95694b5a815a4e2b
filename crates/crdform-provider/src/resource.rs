//! Generic CRUD driver
//!
//! One [`Resource`] drives every CRD kind: the attribute tree decides how state
//! maps onto the manifest, the GVR decides where requests go.
//!
//! Every operation follows the same shape:
//! 1. Decode the Terraform-side value into a [`ResourceState`]
//! 2. Resolve the configured client, refusing early when offline
//! 3. One round-trip through the [`ResourceClient`]
//! 4. Overwrite the domain body with the server's answer, keep bookkeeping

use crdform_schema::ResourceSchema;
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

use crate::client::{ApplyOptions, ResourceClient, ResourceTarget};
use crate::config::{ProviderContext, ProviderData};
use crate::error::{ProviderError, Result};
use crate::import::parse_import_id;
use crate::state::ResourceState;

/// CRUD driver for one resource type
#[derive(Debug)]
pub struct Resource<C> {
    schema: Arc<ResourceSchema>,
    data: ProviderData<C>,
}

impl<C> Clone for Resource<C> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            data: self.data.clone(),
        }
    }
}

impl<C: ResourceClient> Resource<C> {
    /// New, unconfigured resource
    pub fn new(schema: Arc<ResourceSchema>) -> Self {
        Self {
            schema,
            data: ProviderData::Absent,
        }
    }

    /// Resource type name
    pub fn metadata(&self) -> &str {
        &self.schema.type_name
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Accept provider data
    ///
    /// Absent data leaves the resource unconfigured; a payload of the wrong
    /// type is an error.
    pub fn configure(&mut self, data: ProviderData<C>) -> Result<()> {
        match data {
            ProviderData::Absent => Ok(()),
            ProviderData::Malformed { type_name } => {
                Err(ProviderError::Configuration { type_name })
            }
            configured @ ProviderData::Configured(_) => {
                self.data = configured;
                Ok(())
            }
        }
    }

    fn context(&self, operation: &'static str) -> Result<(&ProviderContext<C>, &C)> {
        let context = self
            .data
            .context()
            .map(|context| &**context)
            .ok_or_else(|| ProviderError::NotConfigured(self.schema.type_name.clone()))?;
        match context.client() {
            Some(client) => Ok((context, client)),
            None => {
                tracing::warn!(
                    resource = %self.schema.type_name,
                    operation,
                    "refusing cluster call in offline mode"
                );
                Err(ProviderError::Offline {
                    operation,
                    type_name: self.schema.type_name.clone(),
                })
            }
        }
    }

    /// Decode a plan, fill defaults, and check it against the schema
    fn planned_state(&self, plan: &Value) -> Result<ResourceState> {
        let mut plan = plan.clone();
        self.schema.apply_defaults(&mut plan);

        let issues = self.schema.validate(&plan);
        if !issues.is_empty() {
            return Err(ProviderError::Validation {
                type_name: self.schema.type_name.clone(),
                issues,
            });
        }
        let state = ResourceState::from_value(&plan)?;
        for condition in state.wait_conditions()? {
            condition.parsed_timeout()?;
        }
        Ok(state)
    }

    fn target(&self, state: &ResourceState) -> Result<ResourceTarget> {
        let (namespace, name) = state.coordinates(self.schema.scope)?;
        Ok(ResourceTarget::new(&self.schema, namespace, name))
    }

    /// Apply the planned state and read back what the server stored
    async fn apply(
        &self,
        operation: &'static str,
        context: &ProviderContext<C>,
        client: &C,
        mut state: ResourceState,
    ) -> Result<ResourceState> {
        let target = self.target(&state)?;
        let manifest = self.schema.to_manifest(&state.body_value())?;
        let options = ApplyOptions {
            field_manager: context
                .effective_field_manager(state.field_manager.as_deref())
                .to_string(),
            force: context.effective_force_conflicts(state.force_conflicts),
        };

        let span = tracing::debug_span!(
            "apply",
            operation,
            resource = %self.schema.type_name,
            namespace = target.namespace.as_deref().unwrap_or(""),
            name = %target.name,
            field_manager = %options.field_manager,
            force = options.force,
        );
        let response = async {
            tracing::debug!("sending server-side apply");
            client.apply(&target, &manifest, &options).await
        }
        .instrument(span)
        .await?;

        state.replace_body(self.schema.from_manifest(&response)?);
        Ok(state)
    }

    /// Create the object and return the new state
    pub async fn create(&self, plan: &Value) -> Result<Value> {
        let (context, client) = self.context("create")?;
        let mut state = self.planned_state(plan)?;
        state.id = Some(state.compute_id(self.schema.scope)?);

        let state = self.apply("create", context, client, state).await?;
        tracing::info!(resource = %self.schema.type_name, id = ?state.id, "created");
        state.to_value()
    }

    /// Refresh the domain attributes from the cluster
    pub async fn read(&self, state: &Value) -> Result<Value> {
        let (_, client) = self.context("read")?;
        let mut state = ResourceState::from_value(state)?;
        let target = self.target(&state)?;

        let span = tracing::debug_span!(
            "get",
            resource = %self.schema.type_name,
            namespace = target.namespace.as_deref().unwrap_or(""),
            name = %target.name,
        );
        // A missing object is reported like any other failure
        let object = client.get(&target).instrument(span).await?;

        state.replace_body(self.schema.from_manifest(&object)?);
        state.to_value()
    }

    /// Apply a changed plan; the existing `id` is kept
    pub async fn update(&self, plan: &Value) -> Result<Value> {
        let (context, client) = self.context("update")?;
        let mut state = self.planned_state(plan)?;
        if state.id.is_none() {
            state.id = Some(state.compute_id(self.schema.scope)?);
        }

        let state = self.apply("update", context, client, state).await?;
        tracing::info!(resource = %self.schema.type_name, id = ?state.id, "updated");
        state.to_value()
    }

    /// Delete the object; does not wait for it to disappear
    pub async fn delete(&self, state: &Value) -> Result<()> {
        let (_, client) = self.context("delete")?;
        let state = ResourceState::from_value(state)?;
        let target = self.target(&state)?;

        let span = tracing::debug_span!(
            "delete",
            resource = %self.schema.type_name,
            namespace = target.namespace.as_deref().unwrap_or(""),
            name = %target.name,
        );
        client.delete(&target).instrument(span).await?;
        tracing::info!(resource = %self.schema.type_name, id = ?state.id, "deleted");
        Ok(())
    }

    /// State for an existing object, from its import id
    ///
    /// Only the coordinates are set; the next read fills in the rest.
    pub fn import_state(&self, id: &str) -> Result<Value> {
        let import = parse_import_id(id, self.schema.scope)?;
        let state = ResourceState::imported(&self.schema, import.namespace.as_deref(), &import.name);
        state.to_value()
    }
}
