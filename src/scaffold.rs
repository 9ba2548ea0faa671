//! Starter project scaffolding for `estate init`.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::error::Result;
use crate::resources::ResourceKind;

const CLUSTERS_TEMPLATE: &str = include_str!("../templates/clusters.yaml");
const EXAMPLE_INDEX_TEMPLATE: &str = include_str!("../templates/example-logs.json");
const GITIGNORE_TEMPLATE: &str = include_str!("../templates/gitignore");

/// Creates the starter layout under `directory`.
///
/// Existing files are never overwritten. Returns the paths that were
/// created; an already initialized directory yields an empty list.
///
/// # Errors
///
/// Returns an IO error if a directory or file cannot be created.
pub fn scaffold_project(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    for kind in ResourceKind::ALL {
        let dir = directory.join(kind.dir_name());
        if !dir.is_dir() {
            std::fs::create_dir_all(&dir)?;
            created.push(dir);
        }
    }

    let files = [
        (directory.join(DEFAULT_CONFIG_FILE), CLUSTERS_TEMPLATE),
        (
            directory
                .join(ResourceKind::IndexTemplate.dir_name())
                .join("example-logs.json"),
            EXAMPLE_INDEX_TEMPLATE,
        ),
        (directory.join(".gitignore"), GITIGNORE_TEMPLATE),
    ];
    for (path, content) in files {
        if path.exists() {
            debug!("Keeping existing {}", path.display());
            continue;
        }
        std::fs::write(&path, content)?;
        created.push(path);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigParser;
    use crate::loader::ResourceLoader;
    use tempfile::TempDir;

    #[test]
    fn test_scaffold_creates_layout() {
        let dir = TempDir::new().unwrap();
        let created = scaffold_project(dir.path()).unwrap();

        assert_eq!(created.len(), ResourceKind::ALL.len() + 3);
        for kind in ResourceKind::ALL {
            assert!(dir.path().join(kind.dir_name()).is_dir());
        }
        assert!(dir.path().join(".gitignore").is_file());
    }

    #[test]
    fn test_scaffold_is_idempotent_and_keeps_edits() {
        let dir = TempDir::new().unwrap();
        scaffold_project(dir.path()).unwrap();
        let config = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&config, "clusters: {}\n").unwrap();

        let created = scaffold_project(dir.path()).unwrap();
        assert!(created.is_empty());
        assert_eq!(std::fs::read_to_string(config).unwrap(), "clusters: {}\n");
    }

    #[test]
    fn test_scaffolded_project_loads() {
        let dir = TempDir::new().unwrap();
        scaffold_project(dir.path()).unwrap();

        let resources = ResourceLoader::new(dir.path()).discover().unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name(), "example-logs");

        let config = ConfigParser::new()
            .parse_yaml(CLUSTERS_TEMPLATE, None, |name| {
                (name == "ES_PASSWORD").then(|| String::from("secret"))
            })
            .unwrap();
        assert!(config.clusters.contains_key("local"));
    }
}
