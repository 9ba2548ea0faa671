//! Index lifecycle management policies.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::error::Result;

use super::handler::{keyed_entries, keyed_entry, ResourceHandler};
use super::types::{JsonObject, ResourceKind};

/// Handler for `_ilm/policy`.
///
/// Responses are keyed by policy name and wrap the authored body together
/// with bookkeeping such as `modified_date` and `in_use_by`.
#[derive(Debug, Clone)]
pub struct LifecyclePolicyHandler {
    client: ClusterClient,
}

impl LifecyclePolicyHandler {
    /// Creates a handler over `client`.
    #[must_use]
    pub const fn new(client: ClusterClient) -> Self {
        Self { client }
    }

    fn path(name: &str) -> [&str; 3] {
        ["_ilm", "policy", name]
    }
}

#[async_trait]
impl ResourceHandler for LifecyclePolicyHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::LifecyclePolicy
    }

    async fn fetch(&self, name: &str) -> Result<Option<JsonObject>> {
        let response = self.client.get_json(&Self::path(name)).await?;
        Ok(response.and_then(|response| keyed_entry(response, name)))
    }

    async fn write(&self, name: &str, body: &JsonObject) -> Result<()> {
        debug!("Writing lifecycle policy {name}");
        self.client.put_json(&Self::path(name), body).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        debug!("Deleting lifecycle policy {name}");
        self.client.delete(&Self::path(name)).await
    }

    async fn list_all(&self) -> Result<BTreeMap<String, JsonObject>> {
        let Some(response) = self.client.get_json(&["_ilm", "policy"]).await? else {
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
