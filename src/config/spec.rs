//! Configuration specification types for `clusters.yaml`.
//!
//! These types describe every cluster estate can target and where the
//! resource documents live on disk.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use validator::Validate;

use crate::error::ConfigError;

/// The root configuration loaded from `clusters.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Clusters by name.
    pub clusters: BTreeMap<String, ClusterConfig>,
    /// Root directory holding one sub-directory per resource kind.
    #[serde(default)]
    pub resource_dir: PathBuf,
}

/// Connection settings for one cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ClusterConfig {
    /// Base URL of the cluster REST API.
    #[validate(url(message = "must be a valid http(s) URL"))]
    pub url: String,
    /// Authentication scheme.
    pub auth: AuthConfig,
    /// TLS settings.
    #[serde(default)]
    pub tls: TlsConfig,
}

/// Authentication scheme for a cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// HTTP basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// `Authorization: ApiKey <key>`.
    ApiKey {
        /// Encoded API key.
        api_key: String,
    },
    /// `Authorization: Bearer <token>`.
    Bearer {
        /// Bearer token.
        token: String,
    },
}

/// TLS settings for a cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TlsConfig {
    /// Verify the server certificate.
    #[serde(default = "default_verify")]
    pub verify: bool,
    /// Extra PEM root certificate to trust.
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify: true,
            ca_cert: None,
        }
    }
}

const fn default_verify() -> bool {
    true
}

impl ProjectConfig {
    /// Looks up a cluster by name.
    ///
    /// # Errors
    ///
    /// Returns an error listing the defined clusters if `name` is unknown.
    pub fn cluster(&self, name: &str) -> Result<&ClusterConfig, ConfigError> {
        self.clusters.get(name).ok_or_else(|| ConfigError::UnknownCluster {
            name: name.to_string(),
            available: self
                .clusters
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

impl AuthConfig {
    /// Returns the scheme name as written in `clusters.yaml`.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::ApiKey { .. } => "api_key",
            Self::Bearer { .. } => "bearer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(url: &str) -> ClusterConfig {
        ClusterConfig {
            url: url.to_string(),
            auth: AuthConfig::Bearer {
                token: String::from("t"),
            },
            tls: TlsConfig::default(),
        }
    }

    #[test]
    fn test_unknown_cluster_lists_available() {
        let mut clusters = BTreeMap::new();
        clusters.insert(String::from("staging"), cluster("http://s:9200"));
        clusters.insert(String::from("local"), cluster("http://localhost:9200"));
        let config = ProjectConfig {
            clusters,
            resource_dir: PathBuf::from("."),
        };

        let err = config.cluster("prod").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cluster 'prod' not found in config. Available: local, staging"
        );
        assert!(config.cluster("local").is_ok());
    }

    #[test]
    fn test_auth_deserializes_by_type() {
        let auth: AuthConfig =
            serde_yaml::from_str("type: api_key\napi_key: abc\n").unwrap();
        assert_eq!(
            auth,
            AuthConfig::ApiKey {
                api_key: String::from("abc")
            }
        );
        assert_eq!(auth.scheme(), "api_key");
    }

    #[test]
    fn test_tls_defaults_to_verify() {
        let tls: TlsConfig = serde_yaml::from_str("{}").unwrap();
        assert!(tls.verify);
        assert!(tls.ca_cert.is_none());
    }
}
