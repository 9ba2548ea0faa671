//! Reconciliation plan types and construction.
//!
//! A plan is built fresh on every invocation from live cluster state and is
//! never persisted. Rendering or applying it does not mutate it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::error::{PlanError, Result};
use crate::resources::{DesiredResource, HandlerRegistry, JsonObject, ResourceKind};

use super::diff::{Action, DiffEngine, DiffResult, Narrative};

/// A complete reconciliation plan for one cluster.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Target cluster name.
    pub cluster_name: String,
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
    /// Items in desired-resource order.
    pub items: Vec<PlanItem>,
}

/// A single planned resource.
#[derive(Debug, Clone, Serialize)]
pub struct PlanItem {
    /// Resource name.
    pub name: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Action to take.
    pub action: Action,
    /// Body to write. Present only for actionable items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonObject>,
    /// Diff narrative.
    pub narrative: Narrative,
}

impl From<DiffResult> for PlanItem {
    fn from(result: DiffResult) -> Self {
        let (name, kind, action, desired, narrative) = result.into_parts();
        Self {
            name,
            kind,
            action,
            body: action.is_actionable().then_some(desired),
            narrative,
        }
    }
}

impl PlanItem {
    /// Returns `kind/name`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

impl Plan {
    /// Creates a plan from items.
    #[must_use]
    pub fn new(cluster_name: impl Into<String>, items: Vec<PlanItem>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            created_at: Utc::now(),
            items,
        }
    }

    fn with_action(&self, action: Action) -> impl Iterator<Item = &PlanItem> {
        self.items.iter().filter(move |item| item.action == action)
    }

    /// Items to create.
    #[must_use]
    pub fn creates(&self) -> Vec<&PlanItem> {
        self.with_action(Action::Create).collect()
    }

    /// Items to update.
    #[must_use]
    pub fn updates(&self) -> Vec<&PlanItem> {
        self.with_action(Action::Update).collect()
    }

    /// Items already up to date.
    #[must_use]
    pub fn unchanged(&self) -> Vec<&PlanItem> {
        self.with_action(Action::NoChange).collect()
    }

    /// Items that write to the cluster, in plan order.
    #[must_use]
    pub fn actionable(&self) -> Vec<&PlanItem> {
        self.items
            .iter()
            .filter(|item| item.action.is_actionable())
            .collect()
    }

    /// Number of items with the given action.
    #[must_use]
    pub fn count(&self, action: Action) -> usize {
        self.with_action(action).count()
    }

    /// Returns true if any item needs a write.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.items.iter().any(|item| item.action.is_actionable())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_changes() {
            return write!(f, "No changes for cluster '{}'", self.cluster_name);
        }

        writeln!(
            f,
            "Plan for '{}': {} to create, {} to update, {} unchanged",
            self.cluster_name,
            self.count(Action::Create),
            self.count(Action::Update),
            self.count(Action::NoChange)
        )?;
        for item in self.actionable() {
            writeln!(f, "  {} {}", item.action, item.label())?;
        }
        Ok(())
    }
}

/// Builds plans by diffing each desired resource in order.
pub struct Planner<'a> {
    registry: &'a dyn HandlerRegistry,
    engine: DiffEngine,
}

impl<'a> Planner<'a> {
    /// Creates a planner resolving handlers through `registry`.
    #[must_use]
    pub fn new(registry: &'a dyn HandlerRegistry) -> Self {
        Self {
            registry,
            engine: DiffEngine::new(),
        }
    }

    /// Generates a plan for `cluster_name`.
    ///
    /// Resources are processed strictly in the given order, which the plan
    /// preserves. Nothing is written to the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::FetchFailed`] on the first resource whose live
    /// state cannot be read. No partial plan is returned.
    pub async fn generate_plan(
        &self,
        cluster_name: &str,
        desired: &[DesiredResource],
    ) -> Result<Plan> {
        info!("Planning {} resources for cluster '{cluster_name}'", desired.len());

        let mut items = Vec::with_capacity(desired.len());
        for resource in desired {
            let handler = self.registry.handler_for(resource.kind());
            let result = self
                .engine
                .diff(resource, handler)
                .await
                .map_err(|e| PlanError::FetchFailed {
                    kind: resource.kind(),
                    name: resource.name().to_string(),
                    source: Box::new(e),
                })?;
            items.push(PlanItem::from(result));
        }

        Ok(Plan::new(cluster_name, items))
    }
}

impl fmt::Debug for Planner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstateError;
    use crate::resources::testing::{object, InMemoryHandler, InMemoryRegistry};
    use serde_json::json;

    fn policy(min_age: &str) -> JsonObject {
        object(json!({
            "policy": {
                "phases": {
                    "hot": {"actions": {"rollover": {"max_age": "7d"}}},
                    "delete": {"min_age": min_age, "actions": {"delete": {}}}
                }
            }
        }))
    }

    fn index_body() -> JsonObject {
        object(json!({
            "settings": {"index": {"number_of_shards": "1"}},
            "mappings": {"properties": {"message": {"type": "text"}}}
        }))
    }

    fn mixed_registry() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
        let mut live_policy = policy("30d");
        live_policy.insert(String::from("version"), json!(4));
        live_policy.insert(String::from("modified_date"), json!("2024-01-01"));
        registry
            .handler(ResourceKind::LifecyclePolicy)
            .insert("logs-policy", live_policy);

        let mut live_index = index_body();
        live_index["settings"]["index"]["uuid"] = json!("Xy1");
        live_index["settings"]["index"]["creation_date"] = json!("1700000000000");
        registry
            .handler(ResourceKind::Index)
            .insert("logs-000001", live_index);
        registry
    }

    fn mixed_desired() -> Vec<DesiredResource> {
        vec![
            DesiredResource::new(ResourceKind::LifecyclePolicy, "logs-policy", policy("90d")),
            DesiredResource::new(
                ResourceKind::IngestPipeline,
                "parse-logs",
                object(json!({"processors": [{"set": {"field": "a", "value": 1}}]})),
            ),
            DesiredResource::new(ResourceKind::Index, "logs-000001", index_body()),
        ]
    }

    #[tokio::test]
    async fn test_mixed_plan() {
        let registry = mixed_registry();
        let plan = Planner::new(&registry)
            .generate_plan("prod", &mixed_desired())
            .await
            .unwrap();

        assert_eq!(plan.cluster_name, "prod");
        assert_eq!(plan.creates().len(), 1);
        assert_eq!(plan.updates().len(), 1);
        assert_eq!(plan.unchanged().len(), 1);
        assert!(plan.has_changes());

        let names: Vec<&str> = plan.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["logs-policy", "parse-logs", "logs-000001"]);

        let update = plan.updates()[0];
        assert_eq!(update.name, "logs-policy");
        assert!(update.narrative.to_string().contains("\"30d\" -> \"90d\""));
        assert_eq!(plan.creates()[0].name, "parse-logs");
    }

    #[tokio::test]
    async fn test_no_change_items_carry_no_body() {
        let registry = mixed_registry();
        let plan = Planner::new(&registry)
            .generate_plan("prod", &mixed_desired())
            .await
            .unwrap();

        for item in &plan.items {
            assert_eq!(item.body.is_some(), item.action.is_actionable());
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_planning() {
        let registry = InMemoryRegistry::new().with_handler(
            InMemoryHandler::new(ResourceKind::IngestPipeline).fail_on("parse-logs"),
        );
        let err = Planner::new(&registry)
            .generate_plan("prod", &mixed_desired())
            .await
            .unwrap_err();

        match err {
            EstateError::Plan(PlanError::FetchFailed { kind, name, .. }) => {
                assert_eq!(kind, ResourceKind::IngestPipeline);
                assert_eq!(name, "parse-logs");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_desired_set() {
        let registry = InMemoryRegistry::new();
        let plan = Planner::new(&registry).generate_plan("dev", &[]).await.unwrap();
        assert!(plan.items.is_empty());
        assert!(!plan.has_changes());
        assert_eq!(plan.to_string(), "No changes for cluster 'dev'");
    }

    #[tokio::test]
    async fn test_plan_serializes_without_unchanged_bodies() {
        let registry = mixed_registry();
        let plan = Planner::new(&registry)
            .generate_plan("prod", &mixed_desired())
            .await
            .unwrap();

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["items"][2]["action"], "no_change");
        assert!(value["items"][2].get("body").is_none());
        assert_eq!(value["items"][1]["kind"], "ingest_pipelines");
    }
}
