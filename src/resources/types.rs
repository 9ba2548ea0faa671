//! Resource kinds and desired-resource documents.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A JSON object body, with keys kept in source order.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// The kinds of cluster resources estate manages.
///
/// Serialized as the directory name, the same spelling `--type` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ResourceKind {
    /// Composable index template (`_index_template`).
    #[serde(rename = "index_templates")]
    IndexTemplate,
    /// Component template (`_component_template`).
    #[serde(rename = "component_templates")]
    ComponentTemplate,
    /// Index lifecycle policy (`_ilm/policy`).
    #[serde(rename = "ilm_policies")]
    LifecyclePolicy,
    /// Ingest pipeline (`_ingest/pipeline`).
    #[serde(rename = "ingest_pipelines")]
    IngestPipeline,
    /// Concrete index. Create-only.
    #[serde(rename = "indices")]
    Index,
}

impl ResourceKind {
    /// Every kind, in the order resources are loaded and planned.
    pub const ALL: [Self; 5] = [
        Self::IndexTemplate,
        Self::ComponentTemplate,
        Self::LifecyclePolicy,
        Self::IngestPipeline,
        Self::Index,
    ];

    /// Directory holding this kind's JSON documents.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::IndexTemplate => "index_templates",
            Self::ComponentTemplate => "component_templates",
            Self::LifecyclePolicy => "ilm_policies",
            Self::IngestPipeline => "ingest_pipelines",
            Self::Index => "indices",
        }
    }

    /// Human-readable singular label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::IndexTemplate => "index template",
            Self::ComponentTemplate => "component template",
            Self::LifecyclePolicy => "lifecycle policy",
            Self::IngestPipeline => "ingest pipeline",
            Self::Index => "index",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.dir_name() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.dir_name()).collect();
                format!("unknown resource type '{s}' (expected one of: {})", valid.join(", "))
            })
    }
}

/// A resource as declared locally, keyed by kind and name.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredResource {
    name: String,
    kind: ResourceKind,
    body: JsonObject,
    source: Option<PathBuf>,
}

impl DesiredResource {
    /// Creates a desired resource with no backing file.
    #[must_use]
    pub fn new(kind: ResourceKind, name: impl Into<String>, body: JsonObject) -> Self {
        Self {
            name: name.into(),
            kind,
            body,
            source: None,
        }
    }

    /// Records the file this resource was loaded from.
    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

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

    /// Desired body as authored.
    #[must_use]
    pub const fn body(&self) -> &JsonObject {
        &self.body
    }

    /// File the resource was loaded from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
