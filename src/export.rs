//! Export of live cluster resources to local documents.
//!
//! Every live resource of the selected kinds is normalized by its handler
//! and written to `<output_dir>/<kind dir>/<name>.json`, the same layout the
//! loader reads.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ExportError, Result};
use crate::resources::{HandlerRegistry, JsonObject, ResourceKind};

/// Exports live resources to files.
pub struct Exporter<'a> {
    registry: &'a dyn HandlerRegistry,
    output_dir: PathBuf,
    force: bool,
}

/// A resource that was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedResource {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Resource name.
    pub name: String,
    /// File written.
    pub path: PathBuf,
}

/// A resource that was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedResource {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Resource name.
    pub name: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of an export run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    /// Cluster the resources came from.
    pub cluster_name: String,
    /// Written resources.
    pub exported: Vec<ExportedResource>,
    /// Skipped resources.
    pub skipped: Vec<SkippedResource>,
}

impl<'a> Exporter<'a> {
    /// Creates an exporter writing under `output_dir`.
    #[must_use]
    pub fn new(registry: &'a dyn HandlerRegistry, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            output_dir: output_dir.into(),
            force: false,
        }
    }

    /// Overwrites existing files when `force` is set.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Exports resources of `kinds` (all kinds when empty), keeping only
    /// `names` when non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::ListFailed`] if a kind cannot be listed and
    /// [`ExportError::WriteFailed`] if a file cannot be written.
    pub async fn export(
        &self,
        cluster_name: &str,
        kinds: &[ResourceKind],
        names: &BTreeSet<String>,
    ) -> Result<ExportReport> {
        let mut kinds = if kinds.is_empty() {
            ResourceKind::ALL.to_vec()
        } else {
            kinds.to_vec()
        };
        kinds.sort();
        kinds.dedup();

        let mut report = ExportReport {
            cluster_name: cluster_name.to_string(),
            ..ExportReport::default()
        };

        for kind in kinds {
            let live = self
                .registry
                .handler_for(kind)
                .list_all()
                .await
                .map_err(|e| ExportError::ListFailed {
                    kind,
                    cluster: cluster_name.to_string(),
                    message: e.to_string(),
                })?;
            debug!("Found {} live {kind} on '{cluster_name}'", live.len());

            let dir = self.output_dir.join(kind.dir_name());
            for (name, body) in live {
                if !names.is_empty() && !names.contains(&name) {
                    continue;
                }

                let path = dir.join(format!("{name}.json"));
                if path.exists() && !self.force {
                    report.skipped.push(SkippedResource {
                        kind,
                        name,
                        reason: String::from("file already exists"),
                    });
                    continue;
                }

                write_document(&path, &body)?;
                report.exported.push(ExportedResource { kind, name, path });
            }
        }

        info!(
            "Exported {} resources from '{cluster_name}' ({} skipped)",
            report.exported.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

impl std::fmt::Debug for Exporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("output_dir", &self.output_dir)
            .field("force", &self.force)
            .finish_non_exhaustive()
    }
}

/// Writes `body` as pretty JSON with a trailing newline.
fn write_document(path: &Path, body: &JsonObject) -> Result<()> {
    let write_failed = |message: String| ExportError::WriteFailed {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_failed(e.to_string()))?;
    }
    let mut content = serde_json::to_string_pretty(body).map_err(|e| write_failed(e.to_string()))?;
    content.push('\n');
    std::fs::write(path, content).map_err(|e| write_failed(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EstateError;
    use crate::resources::testing::{object, InMemoryHandler, InMemoryRegistry};
    use serde_json::json;
    use tempfile::TempDir;

    fn registry() -> InMemoryRegistry {
        let registry = InMemoryRegistry::new();
        registry.handler(ResourceKind::IngestPipeline).insert(
            "parse-logs",
            object(json!({"version": 3, "description": "Parse logs"})),
        );
        registry
            .handler(ResourceKind::IngestPipeline)
            .insert("enrich", object(json!({"processors": []})));
        registry
    }

    #[tokio::test]
    async fn test_export_writes_normalized_documents() {
        let dir = TempDir::new().unwrap();
        let registry = registry();

        let report = Exporter::new(&registry, dir.path())
            .export("prod", &[], &BTreeSet::new())
            .await
            .unwrap();

        assert_eq!(report.exported.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.exported[0].name, "enrich");

        let written =
            std::fs::read_to_string(dir.path().join("ingest_pipelines/parse-logs.json")).unwrap();
        assert_eq!(written, "{\n  \"description\": \"Parse logs\"\n}\n");
    }

    #[tokio::test]
    async fn test_existing_files_are_skipped_unless_forced() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("ingest_pipelines");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("enrich.json"), "local").unwrap();
        let registry = registry();
        let names: BTreeSet<String> = [String::from("enrich")].into();

        let report = Exporter::new(&registry, dir.path())
            .export("prod", &[ResourceKind::IngestPipeline], &names)
            .await
            .unwrap();
        assert!(report.exported.is_empty());
        assert_eq!(report.skipped[0].reason, "file already exists");
        assert_eq!(std::fs::read_to_string(target.join("enrich.json")).unwrap(), "local");

        let report = Exporter::new(&registry, dir.path())
            .with_force(true)
            .export("prod", &[ResourceKind::IngestPipeline], &names)
            .await
            .unwrap();
        assert_eq!(report.exported.len(), 1);
        assert_ne!(std::fs::read_to_string(target.join("enrich.json")).unwrap(), "local");
    }

    #[tokio::test]
    async fn test_repeated_kinds_are_exported_once() {
        let dir = TempDir::new().unwrap();
        let registry = registry();
        let kinds = [
            ResourceKind::IngestPipeline,
            ResourceKind::IngestPipeline,
            ResourceKind::IngestPipeline,
        ];

        let report = Exporter::new(&registry, dir.path())
            .with_force(true)
            .export("prod", &kinds, &BTreeSet::new())
            .await
            .unwrap();

        let names: Vec<&str> = report.exported.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["enrich", "parse-logs"]);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_list_failure_is_export_error() {
        let dir = TempDir::new().unwrap();
        let registry = InMemoryRegistry::new()
            .with_handler(InMemoryHandler::new(ResourceKind::Index).fail_listing());

        let err = Exporter::new(&registry, dir.path())
            .export("prod", &[ResourceKind::Index], &BTreeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EstateError::Export(ExportError::ListFailed { .. })
        ));
    }
}
