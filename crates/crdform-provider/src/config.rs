//! Provider configuration
//!
//! Two layers:
//! - [`ProviderConfig`] is the user-facing file, stored in
//!   `~/.config/crdform/provider.yaml`, with environment overrides
//! - [`ProviderContext`] is the immutable value resources receive at configure
//!   time: client handle plus apply defaults
//!
//! [`ProviderData`] classifies whatever the host hands to a resource's
//! configure step.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ProviderError, Result};

/// Default server-side apply field manager
pub const DEFAULT_FIELD_MANAGER: &str = "crdform";

pub const ENV_FIELD_MANAGER: &str = "CRDFORM_FIELD_MANAGER";
pub const ENV_FORCE_CONFLICTS: &str = "CRDFORM_FORCE_CONFLICTS";
pub const ENV_OFFLINE: &str = "CRDFORM_OFFLINE";

/// Provider configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Field manager used when a resource does not set its own
    #[serde(default = "default_field_manager")]
    pub field_manager: String,

    /// Force through field conflicts when a resource does not say otherwise
    #[serde(default)]
    pub force_conflicts: bool,

    /// Never talk to the cluster
    #[serde(default)]
    pub offline: bool,

    /// Kubeconfig file (falls back to the usual inference when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn default_field_manager() -> String {
    DEFAULT_FIELD_MANAGER.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            field_manager: default_field_manager(),
            force_conflicts: false,
            offline: false,
            kubeconfig: None,
            context: None,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded provider configuration");
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ProviderError::InvalidConfig("could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("crdform").join("provider.yaml"))
    }

    /// Apply `CRDFORM_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(manager) = lookup(ENV_FIELD_MANAGER).filter(|m| !m.is_empty()) {
            self.field_manager = manager;
        }
        if let Some(force) = lookup(ENV_FORCE_CONFLICTS) {
            self.force_conflicts = parse_bool(ENV_FORCE_CONFLICTS, &force)?;
        }
        if let Some(offline) = lookup(ENV_OFFLINE) {
            self.offline = parse_bool(ENV_OFFLINE, &offline)?;
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ProviderError::InvalidConfig(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

/// How a configured provider reaches the cluster
#[derive(Debug)]
pub enum ClientMode<C> {
    Online(C),
    /// Every CRUD call is refused before any client call
    Offline,
}

/// Immutable provider state shared by every resource
#[derive(Debug)]
pub struct ProviderContext<C> {
    client: ClientMode<C>,
    field_manager: String,
    force_conflicts: bool,
}

impl<C> ProviderContext<C> {
    /// Context from a loaded configuration; `client` is ignored when offline
    pub fn from_config(config: &ProviderConfig, client: Option<C>) -> Self {
        let client = match client {
            Some(client) if !config.offline => ClientMode::Online(client),
            _ => ClientMode::Offline,
        };
        Self::new(client, config.field_manager.clone(), config.force_conflicts)
    }

    pub fn new(client: ClientMode<C>, field_manager: impl Into<String>, force_conflicts: bool) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
            force_conflicts,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.client, ClientMode::Offline)
    }

    /// The client, or `None` when offline
    pub fn client(&self) -> Option<&C> {
        match &self.client {
            ClientMode::Online(client) => Some(client),
            ClientMode::Offline => None,
        }
    }

    pub fn field_manager(&self) -> &str {
        &self.field_manager
    }

    pub fn force_conflicts(&self) -> bool {
        self.force_conflicts
    }

    /// Instance field manager when set and non-empty, provider default otherwise
    pub fn effective_field_manager<'a>(&'a self, instance: Option<&'a str>) -> &'a str {
        instance
            .filter(|m| !m.is_empty())
            .unwrap_or(self.field_manager.as_str())
    }

    /// Instance force flag when set, provider default otherwise
    pub fn effective_force_conflicts(&self, instance: Option<bool>) -> bool {
        instance.unwrap_or(self.force_conflicts)
    }
}

/// An untyped provider payload that remembers the name of its type
pub struct RawProviderData {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl RawProviderData {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl std::fmt::Debug for RawProviderData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawProviderData")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// What a resource receives at configure time
#[derive(Debug)]
pub enum ProviderData<C> {
    /// Nothing yet; the host has not configured the provider
    Absent,
    Configured(Arc<ProviderContext<C>>),
    /// A payload of some other type
    Malformed { type_name: String },
}

impl<C> Clone for ProviderData<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Configured(context) => Self::Configured(Arc::clone(context)),
            Self::Malformed { type_name } => Self::Malformed {
                type_name: type_name.clone(),
            },
        }
    }
}

impl<C: Send + Sync + 'static> ProviderData<C> {
    /// Classify a raw payload
    ///
    /// Accepts either a `ProviderContext<C>` or an `Arc` of one.
    pub fn from_raw(raw: Option<RawProviderData>) -> Self {
        let Some(raw) = raw else {
            return Self::Absent;
        };
        let type_name = raw.type_name;
        let value = match raw.value.downcast::<Arc<ProviderContext<C>>>() {
            Ok(context) => return Self::Configured(*context),
            Err(value) => value,
        };
        match value.downcast::<ProviderContext<C>>() {
            Ok(context) => Self::Configured(Arc::new(*context)),
            Err(_) => Self::Malformed {
                type_name: type_name.to_string(),
            },
        }
    }
}

impl<C> ProviderData<C> {
    pub fn configured(context: ProviderContext<C>) -> Self {
        Self::Configured(Arc::new(context))
    }

    pub fn context(&self) -> Option<&Arc<ProviderContext<C>>> {
        match self {
            Self::Configured(context) => Some(context),
            _ => None,
        }
    }
}
