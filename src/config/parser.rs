//! Configuration parser for `clusters.yaml`.
//!
//! Handles loading the YAML file, `${VAR}` environment interpolation,
//! the optional `.env` file and `resource_dir` resolution.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, EstateError, Result};

use super::spec::ProjectConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "clusters.yaml";

/// `${VAR_NAME}` references inside string values.
const ENV_VAR_PATTERN: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// Configuration parser for loading cluster configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for resolving relative paths.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the base path for resolving relative paths.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file, interpolating from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unparsable, or references an
    /// unset environment variable.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ProjectConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to read file: {e}"),
            location: Some(path.display().to_string()),
        })?;

        let mut config =
            self.parse_yaml(&content, Some(path), |name| std::env::var(name).ok())?;

        let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.resource_dir = resolve_resource_dir(config_dir, &config.resource_dir);
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    ///
    /// `lookup` resolves `${VAR}` references; returning `None` fails the
    /// parse with [`ConfigError::MissingEnvVar`]. `resource_dir` is left as
    /// written.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or a variable is unset.
    pub fn parse_yaml<F>(
        &self,
        content: &str,
        source: Option<&Path>,
        lookup: F,
    ) -> Result<ProjectConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Parsing YAML configuration");
        let location = || source.map(|p| p.display().to_string());

        let raw: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("YAML parse error: {e}"),
            location: location(),
        })?;

        let Value::Mapping(mut root) = raw else {
            return Err(ConfigError::ParseError {
                message: String::from("Config file must be a mapping with a 'clusters' key"),
                location: location(),
            }
            .into());
        };
        if !root.contains_key("clusters") {
            return Err(ConfigError::ParseError {
                message: String::from("Config file must contain a 'clusters' key"),
                location: location(),
            }
            .into());
        }

        let pattern = Regex::new(ENV_VAR_PATTERN)
            .map_err(|e| EstateError::internal(format!("Invalid interpolation pattern: {e}")))?;
        for value in root.values_mut() {
            interpolate(value, &pattern, &lookup)?;
        }
        default_auth_type(&mut root);

        let config: ProjectConfig =
            serde_yaml::from_value(Value::Mapping(root)).map_err(|e| ConfigError::ParseError {
                message: format!("Invalid configuration: {e}"),
                location: location(),
            })?;

        debug!("Parsed {} cluster(s)", config.clusters.len());
        Ok(config)
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to load .env file: {e}"),
                location: Some(env_path.display().to_string()),
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Replaces every `${VAR}` in string scalars, recursing through mappings and
/// sequences.
fn interpolate<F>(value: &mut Value, pattern: &Regex, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => {
            if let Some(missing) = pattern
                .captures_iter(s)
                .map(|c| c[1].to_string())
                .find(|name| lookup(name.as_str()).is_none())
            {
                return Err(ConfigError::MissingEnvVar { name: missing }.into());
            }
            let replaced = pattern
                .replace_all(s, |c: &regex::Captures<'_>| lookup(&c[1]).unwrap_or_default())
                .into_owned();
            *s = replaced;
        }
        Value::Mapping(map) => {
            for v in map.values_mut() {
                interpolate(v, pattern, lookup)?;
            }
        }
        Value::Sequence(items) => {
            for v in items {
                interpolate(v, pattern, lookup)?;
            }
        }
        Value::Tagged(tagged) => interpolate(&mut tagged.value, pattern, lookup)?,
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
    Ok(())
}

/// An `auth` block without `type` means basic authentication.
fn default_auth_type(root: &mut Mapping) {
    let Some(Value::Mapping(clusters)) = root.get_mut("clusters") else {
        return;
    };
    for cluster in clusters.values_mut() {
        if let Some(Value::Mapping(auth)) = cluster.get_mut("auth") {
            if !auth.contains_key("type") {
                auth.insert(Value::from("type"), Value::from("basic"));
            }
        }
    }
}

/// Resolves `resource_dir` against the directory holding the config file.
fn resolve_resource_dir(config_dir: &Path, resource_dir: &Path) -> PathBuf {
    if resource_dir.as_os_str().is_empty() {
        config_dir.to_path_buf()
    } else if resource_dir.is_absolute() {
        resource_dir.to_path_buf()
    } else {
        config_dir.join(resource_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
clusters:
  local:
    url: "http://localhost:9200"
    auth:
      username: elastic
      password: changeme
"#;
        let config = ConfigParser::new()
            .parse_yaml(yaml, None, env(&[]))
            .unwrap();

        let local = config.cluster("local").unwrap();
        assert_eq!(local.url, "http://localhost:9200");
        assert_eq!(local.auth.scheme(), "basic");
        assert!(local.tls.verify);
    }

    #[test]
    fn test_interpolates_environment_variables() {
        let yaml = r#"
clusters:
  prod:
    url: "https://${ES_HOST}:9200"
    auth:
      type: api_key
      api_key: "${ES_API_KEY}"
    tls:
      verify: true
      ca_cert: /etc/ssl/ca.pem
"#;
        let config = ConfigParser::new()
            .parse_yaml(
                yaml,
                None,
                env(&[("ES_HOST", "es.example.com"), ("ES_API_KEY", "secret")]),
            )
            .unwrap();

        let prod = config.cluster("prod").unwrap();
        assert_eq!(prod.url, "https://es.example.com:9200");
        assert_eq!(
            prod.auth,
            AuthConfig::ApiKey {
                api_key: String::from("secret")
            }
        );
        assert_eq!(prod.tls.ca_cert, Some(PathBuf::from("/etc/ssl/ca.pem")));
    }

    #[test]
    fn test_missing_variable_is_an_error() {
        let yaml = r#"
clusters:
  local:
    url: "http://localhost:9200"
    auth:
      type: bearer
      token: "${ES_TOKEN}"
"#;
        let err = ConfigParser::new()
            .parse_yaml(yaml, None, env(&[]))
            .unwrap_err();
        assert!(matches!(
            err,
            EstateError::Config(ConfigError::MissingEnvVar { ref name }) if name == "ES_TOKEN"
        ));
    }

    #[test]
    fn test_requires_clusters_key() {
        let err = ConfigParser::new()
            .parse_yaml("resource_dir: ./resources\n", None, env(&[]))
            .unwrap_err();
        assert!(err.to_string().contains("'clusters'"));
    }

    #[test]
    fn test_unknown_auth_type_is_rejected() {
        let yaml = r#"
clusters:
  local:
    url: "http://localhost:9200"
    auth:
      type: kerberos
"#;
        assert!(ConfigParser::new().parse_yaml(yaml, None, env(&[])).is_err());
    }

    #[test]
    fn test_load_file_resolves_resource_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(
            &path,
            "resource_dir: es\nclusters:\n  local:\n    url: http://localhost:9200\n    auth:\n      type: bearer\n      token: t\n",
        )
        .unwrap();

        let config = ConfigParser::new().load_file(&path).unwrap();
        assert_eq!(config.resource_dir, dir.path().join("es"));
    }

    #[test]
    fn test_load_file_defaults_resource_dir_to_config_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(
            &path,
            "clusters:\n  local:\n    url: http://localhost:9200\n    auth:\n      type: bearer\n      token: t\n",
        )
        .unwrap();

        let config = ConfigParser::new().load_file(&path).unwrap();
        assert_eq!(config.resource_dir, dir.path());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ConfigParser::new()
            .load_file("/nonexistent/clusters.yaml")
            .unwrap_err();
        assert!(err.to_string().contains("estate init"));
    }
}
