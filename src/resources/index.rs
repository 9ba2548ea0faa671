//! Concrete indices.
//!
//! Indices are create-only. Settings such as `number_of_shards` cannot
//! change after creation and mappings only evolve additively, so an
//! existing index is never overwritten or deleted by this handler.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::cluster::ClusterClient;
use crate::error::{ResourceError, Result};

use super::handler::{keyed_entries, keyed_entry, ResourceHandler};
use super::types::{JsonObject, ResourceKind};

/// Listing covers open and closed indices.
const LIST_PATH: &[&str] = &["*"];
const LIST_QUERY: &[(&str, &str)] = &[("expand_wildcards", "open,closed")];

/// Handler for concrete indices.
#[derive(Debug, Clone)]
pub struct IndexHandler {
    client: ClusterClient,
}

impl IndexHandler {
    /// Creates a handler over `client`.
    #[must_use]
    pub const fn new(client: ClusterClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceHandler for IndexHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Index
    }

    async fn fetch(&self, name: &str) -> Result<Option<JsonObject>> {
        let response = self.client.get_json(&[name]).await?;
        Ok(response.and_then(|response| keyed_entry(response, name)))
    }

    async fn write(&self, name: &str, body: &JsonObject) -> Result<()> {
        if self.client.exists(&[name]).await? {
            warn!("Index {name} already exists, refusing to overwrite");
            return Err(ResourceError::Immutable {
                kind: ResourceKind::Index,
                name: name.to_string(),
            }
            .into());
        }
        debug!("Creating index {name}");
        self.client.put_json(&[name], body).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        Err(ResourceError::UnsupportedOperation {
            kind: ResourceKind::Index,
            operation: "delete",
            name: name.to_string(),
        }
        .into())
    }

    async fn list_all(&self) -> Result<BTreeMap<String, JsonObject>> {
        let Some(response) = self.client.get_json_with_query(LIST_PATH, LIST_QUERY).await? else {
            return Ok(BTreeMap::new());
        };
        Ok(keyed_entries(response)
            .into_iter()
            .filter(|(name, _)| !name.starts_with('.'))
            .map(|(name, body)| {
                let body = self.normalize(&body);
                (name, body)
            })
            .collect())
    }
}
