//! Ingest pipelines.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::error::Result;

use super::handler::{keyed_entries, keyed_entry, ResourceHandler};
use super::types::{JsonObject, ResourceKind};

/// Handler for `_ingest/pipeline`.
#[derive(Debug, Clone)]
pub struct IngestPipelineHandler {
    client: ClusterClient,
}

impl IngestPipelineHandler {
    /// Creates a handler over `client`.
    #[must_use]
    pub const fn new(client: ClusterClient) -> Self {
        Self { client }
    }

    fn path(name: &str) -> [&str; 3] {
        ["_ingest", "pipeline", name]
    }
}

#[async_trait]
impl ResourceHandler for IngestPipelineHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::IngestPipeline
    }

    async fn fetch(&self, name: &str) -> Result<Option<JsonObject>> {
        let response = self.client.get_json(&Self::path(name)).await?;
        Ok(response.and_then(|response| keyed_entry(response, name)))
    }

    async fn write(&self, name: &str, body: &JsonObject) -> Result<()> {
        debug!("Writing ingest pipeline {name}");
        self.client.put_json(&Self::path(name), body).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        debug!("Deleting ingest pipeline {name}");
        self.client.delete(&Self::path(name)).await
    }

    async fn list_all(&self) -> Result<BTreeMap<String, JsonObject>> {
        let Some(response) = self.client.get_json(&["_ingest", "pipeline"]).await? else {
            return Ok(BTreeMap::new());
        };
        Ok(keyed_entries(response)
            .into_iter()
            .map(|(name, body)| {
                let body = self.normalize(&body);
                (name, body)
            })
            .collect())
    }
}
