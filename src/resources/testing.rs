//! In-memory handlers for planner and applier tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::error::{ClusterError, ResourceError, Result};

use super::handler::{HandlerRegistry, ResourceHandler};
use super::types::{JsonObject, ResourceKind};

/// A handler backed by a map, mimicking the cluster's create/overwrite rules.
#[derive(Debug)]
pub struct InMemoryHandler {
    kind: ResourceKind,
    store: Mutex<BTreeMap<String, JsonObject>>,
    failing: BTreeSet<String>,
    fail_list: bool,
    writes: Mutex<Vec<String>>,
}

impl InMemoryHandler {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            store: Mutex::new(BTreeMap::new()),
            failing: BTreeSet::new(),
            fail_list: false,
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Seeds the store with a live body, as the cluster would return it.
    pub fn insert(&self, name: &str, body: JsonObject) {
        self.store.lock().unwrap().insert(name.to_string(), body);
    }

    /// Makes every call touching `name` fail with a cluster error.
    pub fn fail_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Makes `list_all` fail with a cluster error.
    pub fn fail_listing(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn get(&self, name: &str) -> Option<JsonObject> {
        self.store.lock().unwrap().get(name).cloned()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.failing.contains(name) {
            return Err(ClusterError::request_failed(500, format!("injected failure for {name}")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler for InMemoryHandler {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn fetch(&self, name: &str) -> Result<Option<JsonObject>> {
        self.check(name)?;
        Ok(self.get(name))
    }

    async fn write(&self, name: &str, body: &JsonObject) -> Result<()> {
        self.check(name)?;
        let mut store = self.store.lock().unwrap();
        if self.kind == ResourceKind::Index && store.contains_key(name) {
            return Err(ResourceError::Immutable {
                kind: self.kind,
                name: name.to_string(),
            }
            .into());
        }
        store.insert(name.to_string(), body.clone());
        self.writes.lock().unwrap().push(name.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.check(name)?;
        self.store.lock().unwrap().remove(name);
        Ok(())
    }

    async fn list_all(&self) -> Result<BTreeMap<String, JsonObject>> {
        if self.fail_list {
            return Err(ClusterError::request_failed(500, "injected listing failure").into());
        }
        Ok(self
            .store
            .lock()
            .unwrap()
            .iter()
            .map(|(name, body)| (name.clone(), self.normalize(body)))
            .collect())
    }
}

/// One in-memory handler per kind.
#[derive(Debug)]
pub struct InMemoryRegistry {
    handlers: BTreeMap<ResourceKind, InMemoryHandler>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            handlers: ResourceKind::ALL
                .into_iter()
                .map(|kind| (kind, InMemoryHandler::new(kind)))
                .collect(),
        }
    }

    /// Replaces the handler for its kind.
    pub fn with_handler(mut self, handler: InMemoryHandler) -> Self {
        self.handlers.insert(handler.kind, handler);
        self
    }

    pub fn handler(&self, kind: ResourceKind) -> &InMemoryHandler {
        &self.handlers[&kind]
    }
}

impl HandlerRegistry for InMemoryRegistry {
    fn handler_for(&self, kind: ResourceKind) -> &dyn ResourceHandler {
        self.handler(kind)
    }
}

/// Unwraps a `json!` object literal.
pub fn object(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
