//! Configuration validation for cluster definitions.
//!
//! Checks every cluster before a client is built so that a bad URL or an
//! empty credential surfaces as a configuration error instead of a
//! confusing transport failure.

use crate::error::{ConfigError, EstateError, Result};
use tracing::debug;
use validator::Validate;

use super::spec::{AuthConfig, ClusterConfig, ProjectConfig};

/// Validator for cluster configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all errors found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationIssue>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationIssue {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a project configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error found if validation fails.
    pub fn validate(&self, config: &ProjectConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        if config.clusters.is_empty() {
            result.errors.push(ValidationIssue {
                field: String::from("clusters"),
                message: String::from("At least one cluster must be defined"),
            });
        }

        for (name, cluster) in &config.clusters {
            Self::validate_cluster(name, cluster, &mut result);
        }

        if result.errors.is_empty() {
            debug!("Configuration validation passed");
            Ok(result)
        } else {
            let first_error = &result.errors[0];
            Err(EstateError::Config(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )))
        }
    }

    /// Validates one cluster entry.
    fn validate_cluster(name: &str, cluster: &ClusterConfig, result: &mut ValidationResult) {
        let field = |suffix: &str| format!("clusters.{name}.{suffix}");

        if cluster.validate().is_err() || !is_http_url(&cluster.url) {
            result.errors.push(ValidationIssue {
                field: field("url"),
                message: format!(
                    "Cluster '{name}': url '{}' must be a valid http(s) URL",
                    cluster.url
                ),
            });
        }

        match &cluster.auth {
            AuthConfig::Basic { username, .. } if username.is_empty() => {
                result.errors.push(ValidationIssue {
                    field: field("auth.username"),
                    message: format!("Cluster '{name}': basic auth requires a username"),
                });
            }
            AuthConfig::ApiKey { api_key } if api_key.is_empty() => {
                result.errors.push(ValidationIssue {
                    field: field("auth.api_key"),
                    message: format!("Cluster '{name}': api_key auth requires 'api_key'"),
                });
            }
            AuthConfig::Bearer { token } if token.is_empty() => {
                result.errors.push(ValidationIssue {
                    field: field("auth.token"),
                    message: format!("Cluster '{name}': bearer auth requires 'token'"),
                });
            }
            _ => {}
        }

        if let Some(ca_cert) = &cluster.tls.ca_cert {
            if !ca_cert.exists() {
                result.errors.push(ValidationIssue {
                    field: field("tls.ca_cert"),
                    message: format!(
                        "Cluster '{name}': CA certificate not found: {}",
                        ca_cert.display()
                    ),
                });
            }
        }

        if !cluster.tls.verify && cluster.url.starts_with("https://") {
            result.warnings.push(format!(
                "Cluster '{name}': TLS certificate verification is disabled"
            ));
        }
    }
}

impl ValidationResult {
    /// Returns true if no errors were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks the scheme, since the `url` validator accepts any scheme.
fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
