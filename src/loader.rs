//! Desired-resource discovery.
//!
//! Resources live one JSON document per file under a directory per kind:
//!
//! ```text
//! <resource_dir>/
//!   index_templates/logs.json
//!   ilm_policies/logs-policy.json
//!   ...
//! ```
//!
//! The file stem is the resource name. Resources are returned sorted by
//! kind, then by name.

use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::resources::{DesiredResource, JsonObject, ResourceKind};

/// Loads desired resources from a resource directory.
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    /// Root directory containing one subdirectory per kind.
    base_dir: PathBuf,
    /// Kinds to scan. Empty means all.
    kinds: Vec<ResourceKind>,
    /// Names to keep. Empty means all.
    names: BTreeSet<String>,
}

impl ResourceLoader {
    /// Creates a loader rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            kinds: Vec::new(),
            names: BTreeSet::new(),
        }
    }

    /// Restricts loading to the given kinds.
    #[must_use]
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self.kinds.sort();
        self.kinds.dedup();
        self
    }

    /// Restricts loading to the given resource names.
    #[must_use]
    pub fn with_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Loads every matching resource.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first file whose name is not
    /// valid UTF-8 or whose content is not a readable JSON object.
    pub fn discover(&self) -> Result<Vec<DesiredResource>> {
        let mut resources = Vec::new();
        for (kind, path) in self.files()? {
            let name = resource_name(&path)?;
            let body = load_json_file(&path)?;
            debug!("Loaded {kind}/{name} from {}", path.display());
            resources.push(DesiredResource::new(kind, name, body).with_source(path));
        }
        Ok(resources)
    }

    /// Checks every matching file and returns all problems found.
    ///
    /// An empty result means every file is valid.
    ///
    /// # Errors
    ///
    /// Returns an error only if a kind directory cannot be listed.
    pub fn validate(&self) -> Result<Vec<ValidationError>> {
        Ok(self
            .files()?
            .into_iter()
            .filter_map(|(_, path)| {
                resource_name(&path)
                    .and_then(|_| load_json_file(&path))
                    .err()
            })
            .collect())
    }

    /// Number of matching resource files.
    ///
    /// # Errors
    ///
    /// Returns an error if a kind directory cannot be listed.
    pub fn file_count(&self) -> Result<usize> {
        Ok(self.files()?.len())
    }

    fn scanned_kinds(&self) -> &[ResourceKind] {
        if self.kinds.is_empty() {
            &ResourceKind::ALL
        } else {
            &self.kinds
        }
    }

    /// Lists matching `*.json` files, sorted by kind then file name.
    fn files(&self) -> Result<Vec<(ResourceKind, PathBuf)>> {
        let mut files = Vec::new();

        for &kind in self.scanned_kinds() {
            let dir = self.base_dir.join(kind.dir_name());
            if !dir.is_dir() {
                continue;
            }

            let mut paths = Vec::new();
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                let is_json = path.extension().is_some_and(|ext| ext == "json");
                if is_json && path.is_file() {
                    paths.push(path);
                }
            }
            paths.sort();

            files.extend(
                paths
                    .into_iter()
                    .filter(|path| {
                        self.names.is_empty()
                            || resource_name(path).is_ok_and(|name| self.names.contains(&name))
                    })
                    .map(|path| (kind, path)),
            );
        }

        Ok(files)
    }
}

fn resource_name(path: &Path) -> std::result::Result<String, ValidationError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::InvalidName {
            path: path.to_path_buf(),
        })
}

fn load_json_file(path: &Path) -> std::result::Result<JsonObject, ValidationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ValidationError::Unreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|e| ValidationError::InvalidJson {
        path: path.to_path_buf(),
        message: e.to_string(),
        line: e.line(),
        column: e.column(),
    })?;

    match value {
        Value::Object(body) => Ok(body),
        other => Err(ValidationError::NotAnObject {
            path: path.to_path_buf(),
            found: json_type_name(&other),
        }),
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
