//! CLI commands

pub mod crud;
pub mod import;
pub mod resources;
pub mod schema;
pub mod validate;

use crdform_provider::{
    KubeResourceClient, Provider, ProviderConfig, ProviderContext, ProviderData,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub offline: bool,
    pub provider: String,
}

impl GlobalOptions {
    /// Provider configuration: file, then environment, then flags
    pub fn load_config(&self) -> Result<ProviderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let mut config = ProviderConfig::load_from(path)?;
                config.apply_env(|key| std::env::var(key).ok())?;
                config
            }
            None => ProviderConfig::load()?,
        };
        if self.offline {
            config.offline = true;
        }
        Ok(config)
    }

    /// Registry loaded from CRD files, not yet configured
    pub fn load_provider(&self, crds: &[PathBuf]) -> Result<Provider<KubeResourceClient>> {
        let mut provider = Provider::new(self.provider.clone());
        for path in crds {
            provider.load_crd_file(path)?;
        }
        if provider.is_empty() {
            return Err(CliError::Schema {
                message: "no served CRD versions found".to_string(),
                help: Some("Pass a file containing at least one CustomResourceDefinition".to_string()),
            });
        }
        Ok(provider)
    }

    /// Registry configured for cluster access (or offline)
    pub async fn configured_provider(&self, crd: &Path) -> Result<Provider<KubeResourceClient>> {
        let mut provider = self.load_provider(&[crd.to_path_buf()])?;
        let config = self.load_config()?;
        let client = if config.offline {
            None
        } else {
            Some(KubeResourceClient::from_config(&config).await?)
        };
        provider.configure(ProviderData::configured(ProviderContext::from_config(
            &config, client,
        )))?;
        Ok(provider)
    }
}

/// Pick the resource type: the one requested, or the only one available
pub fn select_type(
    provider: &Provider<KubeResourceClient>,
    requested: Option<&str>,
) -> Result<String> {
    if let Some(name) = requested {
        return Ok(name.to_string());
    }
    let available: Vec<&str> = provider.metadata().collect();
    match available.as_slice() {
        [only] => Ok(only.to_string()),
        _ => Err(CliError::usage_with_help(
            "the CRD file defines several resource types",
            format!("Pick one with --type: {}", available.join(", ")),
        )),
    }
}

/// Read a state document (JSON or YAML)
pub fn read_state(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| {
        CliError::validation(format!("cannot parse state file {}: {}", path.display(), e))
    })
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
