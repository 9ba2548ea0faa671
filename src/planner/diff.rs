//! Diff engine for comparing desired vs live resource state.
//!
//! This module fetches the live body of one desired resource through its
//! handler, normalizes both sides and classifies the delta.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::error::Result;
use crate::resources::{DesiredResource, JsonObject, ResourceHandler, ResourceKind};

use super::structural::{self, ChangeTag};

/// Engine for computing per-resource diffs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffEngine;

/// What has to happen to a resource.
///
/// The declaration order is the rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Resource is absent and will be created.
    Create,
    /// Resource exists and differs.
    Update,
    /// Resource is up to date.
    NoChange,
}

impl Action {
    /// Returns true for actions that write to the cluster.
    #[must_use]
    pub const fn is_actionable(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    /// Past-tense label used in apply reports.
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::NoChange => "unchanged",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::NoChange => "no change",
        };
        write!(f, "{s}")
    }
}

/// One rendered narrative line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeLine {
    /// Change tag, for styling.
    pub tag: ChangeTag,
    /// Rendered line, starting with the tag symbol.
    pub text: String,
}

/// Human-readable description of a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Narrative {
    lines: Vec<NarrativeLine>,
}

impl Narrative {
    /// Narrative for a resource that does not exist yet: every top-level
    /// desired key as an addition, in source order.
    #[must_use]
    pub fn for_create(body: &JsonObject) -> Self {
        let lines = body
            .iter()
            .map(|(key, value)| NarrativeLine {
                tag: ChangeTag::Added,
                text: format!(
                    "{} {}: {value}",
                    ChangeTag::Added.symbol(),
                    structural::key_path(structural::ROOT, key)
                ),
            })
            .collect();
        Self { lines }
    }

    /// Narrative listing structural changes.
    #[must_use]
    pub fn from_changes(changes: &[structural::Change]) -> Self {
        let lines = changes
            .iter()
            .map(|change| NarrativeLine {
                tag: change.kind.tag(),
                text: change.to_string(),
            })
            .collect();
        Self { lines }
    }

    /// Returns the narrative lines.
    #[must_use]
    pub fn lines(&self) -> &[NarrativeLine] {
        &self.lines
    }

    /// Returns true if there is nothing to describe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

/// Outcome of diffing one resource.
#[derive(Debug, Clone)]
pub struct DiffResult {
    name: String,
    kind: ResourceKind,
    action: Action,
    desired: JsonObject,
    current: Option<JsonObject>,
    narrative: Narrative,
}

impl DiffResult {
    /// Resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Classified action.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Desired body as authored.
    #[must_use]
    pub const fn desired(&self) -> &JsonObject {
        &self.desired
    }

    /// Live body as fetched, before normalization. `None` when absent.
    #[must_use]
    pub const fn current(&self) -> Option<&JsonObject> {
        self.current.as_ref()
    }

    /// Diff narrative.
    #[must_use]
    pub const fn narrative(&self) -> &Narrative {
        &self.narrative
    }

    /// Splits the result into its owned parts.
    pub(crate) fn into_parts(self) -> (String, ResourceKind, Action, JsonObject, Narrative) {
        (self.name, self.kind, self.action, self.desired, self.narrative)
    }
}

impl DiffEngine {
    /// Creates a new diff engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Diffs one desired resource against the cluster.
    ///
    /// # Errors
    ///
    /// Returns the handler's error if the live state cannot be fetched.
    pub async fn diff(
        &self,
        desired: &DesiredResource,
        handler: &dyn ResourceHandler,
    ) -> Result<DiffResult> {
        let current = handler.fetch(desired.name()).await?;

        let Some(current) = current else {
            debug!("{}/{} is absent, will create", desired.kind(), desired.name());
            return Ok(DiffResult {
                name: desired.name().to_string(),
                kind: desired.kind(),
                action: Action::Create,
                desired: desired.body().clone(),
                current: None,
                narrative: Narrative::for_create(desired.body()),
            });
        };

        let normalized_desired = Value::Object(handler.normalize(desired.body()));
        let normalized_current = Value::Object(handler.normalize(&current));
        let changes = structural::compare(&normalized_current, &normalized_desired);

        let action = if changes.is_empty() {
            Action::NoChange
        } else {
            Action::Update
        };
        debug!(
            "{}/{}: {action} ({} changes)",
            desired.kind(),
            desired.name(),
            changes.len()
        );

        Ok(DiffResult {
            name: desired.name().to_string(),
            kind: desired.kind(),
            action,
            desired: desired.body().clone(),
            current: Some(current),
            narrative: Narrative::from_changes(&changes),
        })
    }
}
