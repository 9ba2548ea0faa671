//! Resource handler trait and the per-cluster handler registry.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::cluster::ClusterClient;
use crate::error::Result;

use super::component_template::ComponentTemplateHandler;
use super::index::IndexHandler;
use super::index_template::IndexTemplateHandler;
use super::ingest_pipeline::IngestPipelineHandler;
use super::lifecycle_policy::LifecyclePolicyHandler;
use super::normalize::normalize;
use super::types::{JsonObject, ResourceKind};

/// How one kind of remote object is read, written and compared.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// The kind this handler manages.
    fn kind(&self) -> ResourceKind;

    /// Fetches the live body of `name`.
    ///
    /// Returns `None` if the resource does not exist; "not found" is never
    /// an error.
    async fn fetch(&self, name: &str) -> Result<Option<JsonObject>>;

    /// Creates or overwrites `name` with `body`.
    async fn write(&self, name: &str, body: &JsonObject) -> Result<()>;

    /// Deletes `name`.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Lists every live resource of this kind, normalized.
    async fn list_all(&self) -> Result<BTreeMap<String, JsonObject>>;

    /// Returns `body` without server-managed fields.
    fn normalize(&self, body: &JsonObject) -> JsonObject {
        normalize(self.kind(), body)
    }
}

/// Resolves the handler for a resource kind.
pub trait HandlerRegistry: Send + Sync {
    /// Returns the handler for `kind`.
    fn handler_for(&self, kind: ResourceKind) -> &dyn ResourceHandler;
}

/// The five handlers bound to one cluster connection.
#[derive(Debug, Clone)]
pub struct ClusterHandlers {
    index_templates: IndexTemplateHandler,
    component_templates: ComponentTemplateHandler,
    lifecycle_policies: LifecyclePolicyHandler,
    ingest_pipelines: IngestPipelineHandler,
    indices: IndexHandler,
}

impl ClusterHandlers {
    /// Creates handlers sharing `client`.
    #[must_use]
    pub fn new(client: &ClusterClient) -> Self {
        Self {
            index_templates: IndexTemplateHandler::new(client.clone()),
            component_templates: ComponentTemplateHandler::new(client.clone()),
            lifecycle_policies: LifecyclePolicyHandler::new(client.clone()),
            ingest_pipelines: IngestPipelineHandler::new(client.clone()),
            indices: IndexHandler::new(client.clone()),
        }
    }
}

impl HandlerRegistry for ClusterHandlers {
    fn handler_for(&self, kind: ResourceKind) -> &dyn ResourceHandler {
        match kind {
            ResourceKind::IndexTemplate => &self.index_templates,
            ResourceKind::ComponentTemplate => &self.component_templates,
            ResourceKind::LifecyclePolicy => &self.lifecycle_policies,
            ResourceKind::IngestPipeline => &self.ingest_pipelines,
            ResourceKind::Index => &self.indices,
        }
    }
}

/// Takes the object stored under `key` in a name-keyed response
/// (`{"<name>": {...}}`).
pub(crate) fn keyed_entry(response: Value, key: &str) -> Option<JsonObject> {
    match response {
        Value::Object(mut map) => match map.shift_remove(key) {
            Some(Value::Object(body)) => Some(body),
            _ => None,
        },
        _ => None,
    }
}

/// Splits a name-keyed response into `(name, body)` pairs.
pub(crate) fn keyed_entries(response: Value) -> BTreeMap<String, JsonObject> {
    match response {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(name, body)| match body {
                Value::Object(body) => Some((name, body)),
                _ => None,
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Unpacks a template listing
/// (`{"<list_key>": [{"name": "...", "<body_key>": {...}}]}`).
pub(crate) fn template_entries(
    response: Value,
    list_key: &str,
    body_key: &str,
) -> BTreeMap<String, JsonObject> {
    let Value::Object(mut map) = response else {
        return BTreeMap::new();
    };
    let Some(Value::Array(items)) = map.shift_remove(list_key) else {
        return BTreeMap::new();
    };

    items
        .into_iter()
        .filter_map(|item| {
            let Value::Object(mut item) = item else {
                return None;
            };
            let name = match item.shift_remove("name") {
                Some(Value::String(name)) => name,
                _ => return None,
            };
            match item.shift_remove(body_key) {
                Some(Value::Object(body)) => Some((name, body)),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyed_entry() {
        let response = json!({"logs-policy": {"policy": {}}, "other": 1});
        assert!(keyed_entry(response.clone(), "logs-policy").is_some());
        assert!(keyed_entry(response.clone(), "other").is_none());
        assert!(keyed_entry(response, "missing").is_none());
    }

    #[test]
    fn test_template_entries_skip_malformed_items() {
        let response = json!({
            "index_templates": [
                {"name": "logs", "index_template": {"priority": 1}},
                {"name": "broken"},
                {"index_template": {}}
            ]
        });
        let entries = template_entries(response, "index_templates", "index_template");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["logs"]["priority"], 1);
    }

    #[test]
    fn test_registry_maps_every_kind() {
        let client = ClusterClient::new(&crate::config::ClusterConfig {
            url: String::from("http://localhost:9200"),
            auth: crate::config::AuthConfig::Bearer {
                token: String::from("t"),
            },
            tls: crate::config::TlsConfig::default(),
        })
        .unwrap();
        let handlers = ClusterHandlers::new(&client);
        for kind in ResourceKind::ALL {
            assert_eq!(handlers.handler_for(kind).kind(), kind);
        }
    }
}
