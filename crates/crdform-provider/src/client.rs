//! Dynamic resource client
//!
//! [`ResourceClient`] is the seam between the CRUD driver and the cluster.
//! [`KubeResourceClient`] talks to a real API server through kube's dynamic
//! API; [`MockResourceClient`](crate::MockResourceClient) keeps objects in memory.

use async_trait::async_trait;
use crdform_schema::{GroupVersionResource, ResourceSchema};
use kube::{
    Client, Config,
    api::{Api, DeleteParams, DynamicObject, Patch, PatchParams, ValidationDirective},
    config::{KubeConfigOptions, Kubeconfig},
    discovery::ApiResource,
};
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};

/// The object a request is about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceTarget {
    pub gvr: GroupVersionResource,
    pub kind: String,
    /// `None` for cluster-scoped objects
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceTarget {
    pub fn new(schema: &ResourceSchema, namespace: Option<String>, name: impl Into<String>) -> Self {
        Self {
            gvr: schema.gvr.clone(),
            kind: schema.kind.clone(),
            namespace,
            name: name.into(),
        }
    }

    /// kube's description of the resource, built from the GVR without discovery
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.gvr.group.clone(),
            version: self.gvr.version.clone(),
            api_version: self.gvr.api_version(),
            kind: self.kind.clone(),
            plural: self.gvr.resource.clone(),
        }
    }
}

impl std::fmt::Display for ResourceTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

/// Server-side apply options for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub field_manager: String,
    pub force: bool,
}

impl ApplyOptions {
    /// Patch parameters: apply with strict field validation, forced on request
    pub fn patch_params(&self) -> PatchParams {
        let mut params = PatchParams::apply(&self.field_manager);
        if self.force {
            params = params.force();
        }
        params.field_validation = Some(ValidationDirective::Strict);
        params
    }
}

/// Dynamic CRUD on arbitrary objects
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Server-side apply a manifest, returning the object as stored
    async fn apply(
        &self,
        target: &ResourceTarget,
        manifest: &Value,
        options: &ApplyOptions,
    ) -> Result<Value>;

    /// Fetch the current object
    async fn get(&self, target: &ResourceTarget) -> Result<Value>;

    /// Delete the object
    async fn delete(&self, target: &ResourceTarget) -> Result<()>;
}

/// [`ResourceClient`] backed by a Kubernetes API server
#[derive(Clone)]
pub struct KubeResourceClient {
    client: Client,
}

impl KubeResourceClient {
    /// Client from the inferred environment (kubeconfig or in-cluster)
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self { client })
    }

    /// Client for the kubeconfig and context named in the provider configuration
    pub async fn from_config(config: &ProviderConfig) -> Result<Self> {
        let options = KubeConfigOptions {
            context: config.context.clone(),
            ..Default::default()
        };

        let kube_config = match &config.kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)
                    .map_err(|e| ProviderError::Kubeconfig(e.to_string()))?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| ProviderError::Kubeconfig(e.to_string()))?
            }
            None if config.context.is_some() => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| ProviderError::Kubeconfig(e.to_string()))?,
            None => Config::infer()
                .await
                .map_err(|e| ProviderError::Kubeconfig(e.to_string()))?,
        };

        let client = Client::try_from(kube_config)?;
        Ok(Self { client })
    }

    /// Create with an existing Kubernetes client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying Kubernetes client
    pub fn kube_client(&self) -> &Client {
        &self.client
    }

    fn api(&self, target: &ResourceTarget) -> Api<DynamicObject> {
        let ar = target.api_resource();
        match &target.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }
}

impl std::fmt::Debug for KubeResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeResourceClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    async fn apply(
        &self,
        target: &ResourceTarget,
        manifest: &Value,
        options: &ApplyOptions,
    ) -> Result<Value> {
        let params = options.patch_params();
        let object = self
            .api(target)
            .patch(&target.name, &params, &Patch::Apply(manifest))
            .await?;
        Ok(serde_json::to_value(object)?)
    }

    async fn get(&self, target: &ResourceTarget) -> Result<Value> {
        let object = self.api(target).get(&target.name).await?;
        Ok(serde_json::to_value(object)?)
    }

    async fn delete(&self, target: &ResourceTarget) -> Result<()> {
        // Deletion is fire-and-forget; finalizers run server-side
        self.api(target)
            .delete(&target.name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(namespace: Option<&str>) -> ResourceTarget {
        ResourceTarget {
            gvr: GroupVersionResource {
                group: "cert-manager.io".to_string(),
                version: "v1".to_string(),
                resource: "certificates".to_string(),
            },
            kind: "Certificate".to_string(),
            namespace: namespace.map(str::to_string),
            name: "web".to_string(),
        }
    }

    #[test]
    fn test_api_resource() {
        let ar = target(Some("default")).api_resource();
        assert_eq!(ar.api_version, "cert-manager.io/v1");
        assert_eq!(ar.plural, "certificates");
        assert_eq!(ar.kind, "Certificate");
    }

    #[test]
    fn test_target_display() {
        assert_eq!(target(Some("default")).to_string(), "Certificate/default/web");
        assert_eq!(target(None).to_string(), "Certificate/web");
    }

    #[test]
    fn test_patch_params() {
        let params = ApplyOptions {
            field_manager: "crdform".to_string(),
            force: true,
        }
        .patch_params();
        assert_eq!(params.field_manager.as_deref(), Some("crdform"));
        assert!(params.force);
        assert!(matches!(
            params.field_validation,
            Some(ValidationDirective::Strict)
        ));

        let params = ApplyOptions {
            field_manager: "crdform".to_string(),
            force: false,
        }
        .patch_params();
        assert!(!params.force);
    }
}
