//! Composable index templates.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::error::Result;

use super::handler::{template_entries, ResourceHandler};
use super::types::{JsonObject, ResourceKind};

const LIST_KEY: &str = "index_templates";
const BODY_KEY: &str = "index_template";

/// Handler for `_index_template`.
#[derive(Debug, Clone)]
pub struct IndexTemplateHandler {
    client: ClusterClient,
}

impl IndexTemplateHandler {
    /// Creates a handler over `client`.
    #[must_use]
    pub const fn new(client: ClusterClient) -> Self {
        Self { client }
    }

    fn path(name: &str) -> [&str; 2] {
        ["_index_template", name]
    }
}

#[async_trait]
impl ResourceHandler for IndexTemplateHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::IndexTemplate
    }

    async fn fetch(&self, name: &str) -> Result<Option<JsonObject>> {
        let Some(response) = self.client.get_json(&Self::path(name)).await? else {
            return Ok(None);
        };
        let mut entries = template_entries(response, LIST_KEY, BODY_KEY);
        Ok(entries.remove(name))
    }

    async fn write(&self, name: &str, body: &JsonObject) -> Result<()> {
        debug!("Writing index template {name}");
        self.client.put_json(&Self::path(name), body).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        debug!("Deleting index template {name}");
        self.client.delete(&Self::path(name)).await
    }

    async fn list_all(&self) -> Result<BTreeMap<String, JsonObject>> {
        let Some(response) = self.client.get_json(&["_index_template"]).await? else {
            return Ok(BTreeMap::new());
        };
        Ok(template_entries(response, LIST_KEY, BODY_KEY)
            .into_iter()
            .map(|(name, body)| {
                let body = self.normalize(&body);
                (name, body)
            })
            .collect())
    }
}
