//! Plan applier.
//!
//! This module writes the actionable items of a plan one at a time. A
//! failing item is recorded and the remaining items still run; there is no
//! rollback of items already written.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::{ApplyError, EstateError};
use crate::resources::{HandlerRegistry, ResourceKind};

use super::diff::Action;
use super::plan::{Plan, PlanItem};

/// Applies plans through a handler registry.
pub struct Applier<'a> {
    registry: &'a dyn HandlerRegistry,
}

/// Result of applying a single item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    /// Resource name.
    pub name: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Action that was attempted.
    pub action: Action,
    /// Whether the write succeeded.
    pub success: bool,
    /// Error message (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemResult {
    /// Returns `kind/name`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

/// Result of applying a whole plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    /// Per-item results, in plan order.
    pub results: Vec<ItemResult>,
}

impl ApplyReport {
    /// True if every actionable item succeeded. An empty report succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|result| result.success)
    }

    /// Number of successful items.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|result| result.success).count()
    }

    /// Number of failed items.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

impl<'a> Applier<'a> {
    /// Creates an applier resolving handlers through `registry`.
    #[must_use]
    pub fn new(registry: &'a dyn HandlerRegistry) -> Self {
        Self { registry }
    }

    /// Applies every actionable item of `plan`, in order.
    ///
    /// Never fails as a whole: per-item failures, including create-only
    /// refusals, are captured in the report.
    pub async fn apply(&self, plan: &Plan) -> ApplyReport {
        let actionable = plan.actionable();
        if actionable.is_empty() {
            debug!("Nothing to apply on '{}'", plan.cluster_name);
            return ApplyReport::default();
        }

        info!(
            "Applying {} changes to cluster '{}'",
            actionable.len(),
            plan.cluster_name
        );

        let mut report = ApplyReport::default();
        for item in actionable {
            let outcome = self.apply_item(item).await;
            let error = match outcome {
                Ok(()) => {
                    info!("{} {}", item.action.past_tense(), item.label());
                    None
                }
                Err(e) if e.is_refusal() => {
                    warn!("{}: {e}", item.label());
                    Some(e.to_string())
                }
                Err(e) => {
                    error!("Failed to {} {}: {e}", item.action, item.label());
                    Some(e.to_string())
                }
            };
            report.results.push(ItemResult {
                name: item.name.clone(),
                kind: item.kind,
                action: item.action,
                success: error.is_none(),
                error,
            });
        }

        info!(
            "Apply finished: {} succeeded, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }

    async fn apply_item(&self, item: &PlanItem) -> Result<(), EstateError> {
        let body = item.body.as_ref().ok_or_else(|| ApplyError::MissingBody {
            kind: item.kind,
            name: item.name.clone(),
        })?;
        self.registry
            .handler_for(item.kind)
            .write(&item.name, body)
            .await
    }
}

impl std::fmt::Debug for Applier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier").finish_non_exhaustive()
    }
}
