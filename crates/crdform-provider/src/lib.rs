//! crdform provider - CRD-backed resources driven by server-side apply
//!
//! This crate provides:
//! - **Provider registry**: resource types built from CRD files, one per served version
//! - **CRUD driver**: create / read / update / delete / import over any attribute tree
//! - **Configuration**: provider file, environment overrides, offline mode
//! - **Dynamic client**: kube `DynamicObject` access plus an in-memory mock
//! - **Wait-for**: condition data and the waiter seam

pub mod client;
pub mod config;
pub mod error;
pub mod import;
pub mod mock;
pub mod provider;
pub mod resource;
pub mod state;
pub mod wait;

pub use client::{ApplyOptions, KubeResourceClient, ResourceClient, ResourceTarget};
pub use config::{
    ClientMode, DEFAULT_FIELD_MANAGER, ProviderConfig, ProviderContext, ProviderData,
    RawProviderData,
};
pub use error::{ProviderError, Result};
pub use import::{ImportId, parse_import_id};
pub use mock::{MockResourceClient, OperationCounts, RecordedApply};
pub use provider::{DEFAULT_PROVIDER_NAME, Provider};
pub use resource::Resource;
pub use state::ResourceState;
pub use wait::{ConditionWaiter, WaitFor, WaitTimeout};
