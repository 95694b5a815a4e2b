//! Mock resource client for testing
//!
//! Objects live in memory, so CRUD flows can be exercised without a cluster.

use async_trait::async_trait;
use kube::core::ErrorResponse;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::client::{ApplyOptions, ResourceClient, ResourceTarget};
use crate::error::Result;

/// In-memory resource client for testing
#[derive(Clone, Default)]
pub struct MockResourceClient {
    store: Arc<RwLock<HashMap<ResourceTarget, Value>>>,
    operations: Arc<RwLock<OperationCounts>>,
    applies: Arc<RwLock<Vec<RecordedApply>>>,
    /// Fail every call with a 500, for error-path tests
    failing: bool,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub applies: usize,
    pub gets: usize,
    pub deletes: usize,
}

impl OperationCounts {
    pub fn total(&self) -> usize {
        self.applies + self.gets + self.deletes
    }
}

/// One apply call as the server received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedApply {
    pub target: ResourceTarget,
    pub manifest: Value,
    pub options: ApplyOptions,
}

impl MockResourceClient {
    /// Create a new empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every call fails with an internal server error
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Pre-populate an object
    pub fn insert(&self, target: ResourceTarget, object: Value) {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target, object);
    }

    /// Stored object, if any
    pub fn object(&self, target: &ResourceTarget) -> Option<Value> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
            .cloned()
    }

    pub fn object_count(&self) -> usize {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every apply received so far, oldest first
    pub fn recorded_applies(&self) -> Vec<RecordedApply> {
        self.applies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count(&self, bump: impl FnOnce(&mut OperationCounts)) {
        bump(&mut self.operations.write().unwrap_or_else(PoisonError::into_inner));
    }

    fn check_failing(&self) -> Result<()> {
        if self.failing {
            return Err(api_error(500, "InternalError", "mock failure".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MockResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockResourceClient")
            .field("objects", &self.object_count())
            .field("operations", &self.operation_counts())
            .field("failing", &self.failing)
            .finish()
    }
}

fn api_error(code: u16, reason: &str, message: String) -> crate::error::ProviderError {
    kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message,
        reason: reason.to_string(),
        code,
    })
    .into()
}

fn not_found(target: &ResourceTarget) -> crate::error::ProviderError {
    api_error(
        404,
        "NotFound",
        format!("{} \"{}\" not found", target.gvr.resource, target.name),
    )
}

/// Merge a manifest into the stored object the way the server would
fn merge(existing: Option<&Value>, manifest: &Value, generation: usize) -> Value {
    let mut object = manifest.clone();
    let Some(map) = object.as_object_mut() else {
        return object;
    };

    let metadata = map
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(metadata) = metadata.as_object_mut() {
        let uid = existing
            .and_then(|e| e.pointer("/metadata/uid"))
            .cloned()
            .unwrap_or_else(|| Value::String(format!("mock-uid-{}", generation)));
        metadata.insert("uid".to_string(), uid);
        metadata.insert(
            "resourceVersion".to_string(),
            Value::String(generation.to_string()),
        );
    }

    if let Some(status) = existing.and_then(|e| e.get("status")) {
        map.insert("status".to_string(), status.clone());
    }

    object
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    async fn apply(
        &self,
        target: &ResourceTarget,
        manifest: &Value,
        options: &ApplyOptions,
    ) -> Result<Value> {
        self.count(|ops| ops.applies += 1);
        self.check_failing()?;

        self.applies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedApply {
                target: target.clone(),
                manifest: manifest.clone(),
                options: options.clone(),
            });

        let generation = self.operation_counts().applies;
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        let object = merge(store.get(target), manifest, generation);
        store.insert(target.clone(), object.clone());
        Ok(object)
    }

    async fn get(&self, target: &ResourceTarget) -> Result<Value> {
        self.count(|ops| ops.gets += 1);
        self.check_failing()?;

        self.object(target).ok_or_else(|| not_found(target))
    }

    async fn delete(&self, target: &ResourceTarget) -> Result<()> {
        self.count(|ops| ops.deletes += 1);
        self.check_failing()?;

        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(target)
            .map(|_| ())
            .ok_or_else(|| not_found(target))
    }
}
