//! Error types for the estate reconciliation tool.
//!
//! This module provides the error hierarchy for every stage of a run:
//! configuration, resource loading, cluster transport, planning, applying
//! and exporting.

use std::path::PathBuf;
use thiserror::Error;

use crate::resources::ResourceKind;

/// The main error type for estate.
#[derive(Debug, Error)]
pub enum EstateError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resource document validation errors.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Cluster transport errors.
    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// Resource-level refusals raised by a handler.
    #[error("{0}")]
    Resource(#[from] ResourceError),

    /// Planning errors.
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// Apply contract violations.
    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),

    /// Export errors.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Config file not found: {}. Run 'estate init' to create a starter project.", .path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// An interpolated environment variable is not set.
    #[error("Environment variable '{name}' is referenced in config but not set")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },

    /// The requested cluster is not defined.
    #[error("Cluster '{name}' not found in config. Available: {available}")]
    UnknownCluster {
        /// Requested cluster name.
        name: String,
        /// Comma-separated list of defined clusters.
        available: String,
    },
}

/// Errors raised while reading local resource documents.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The file could not be read.
    #[error("Cannot read file {}: {message}", .path.display())]
    Unreadable {
        /// Path to the file.
        path: PathBuf,
        /// Underlying IO message.
        message: String,
    },

    /// The file is not valid JSON.
    #[error("Invalid JSON in {}: {message} (line {line}, col {column})", .path.display())]
    InvalidJson {
        /// Path to the file.
        path: PathBuf,
        /// Parser message.
        message: String,
        /// Line of the syntax error.
        line: usize,
        /// Column of the syntax error.
        column: usize,
    },

    /// The file name cannot be used as a resource name.
    #[error("Resource file name {} is not valid UTF-8", .path.display())]
    InvalidName {
        /// Path to the file.
        path: PathBuf,
    },

    /// The document parsed but is not a JSON object.
    #[error("Resource file {} must contain a JSON object, got {found}", .path.display())]
    NotAnObject {
        /// Path to the file.
        path: PathBuf,
        /// JSON type that was found instead.
        found: &'static str,
    },
}

/// Cluster transport errors.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The cluster could not be reached.
    #[error("Cannot connect to cluster at {url}: {message}")]
    ConnectionFailed {
        /// Target URL.
        url: String,
        /// Description of the network error.
        message: String,
    },

    /// Authentication was rejected.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// The cluster answered with a non-success status.
    #[error("Request failed: {status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response body was not what the API documents.
    #[error("Invalid response from cluster: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// The HTTP client could not be built (TLS material, headers).
    #[error("Failed to create cluster client: {message}")]
    ClientSetup {
        /// Description of the setup failure.
        message: String,
    },
}

/// Refusals raised by resource handlers.
///
/// These are expected outcomes during apply, not system faults.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// An overwrite was attempted on a create-only resource.
    #[error(
        "{} '{name}' already exists and is create-only; it cannot be overwritten in place. \
         Delete or reindex it through the cluster API directly.",
        .kind.label()
    )]
    Immutable {
        /// Kind of the resource.
        kind: ResourceKind,
        /// Name of the resource.
        name: String,
    },

    /// The handler refuses this operation for its kind.
    #[error(
        "Refusing to {operation} {} '{name}': this operation is not supported for {} resources. \
         Use the cluster API directly if it is really intended.",
        .kind.label(),
        .kind.label()
    )]
    UnsupportedOperation {
        /// Kind of the resource.
        kind: ResourceKind,
        /// Refused operation.
        operation: &'static str,
        /// Name of the resource.
        name: String,
    },
}

/// Planning errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Current state of a resource could not be read.
    #[error("Failed to fetch {kind}/{name}: {source}")]
    FetchFailed {
        /// Kind of the resource.
        kind: ResourceKind,
        /// Name of the resource.
        name: String,
        /// Underlying failure.
        #[source]
        source: Box<EstateError>,
    },
}

/// Apply contract violations.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// An actionable plan item carries no body.
    #[error("No desired body for {kind}/{name}")]
    MissingBody {
        /// Kind of the resource.
        kind: ResourceKind,
        /// Name of the resource.
        name: String,
    },
}

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Listing live resources failed.
    #[error("Failed to list {kind} from cluster '{cluster}': {message}")]
    ListFailed {
        /// Kind being listed.
        kind: ResourceKind,
        /// Cluster name.
        cluster: String,
        /// Underlying failure.
        message: String,
    },

    /// Writing an exported document failed.
    #[error("Failed to write {}: {message}", .path.display())]
    WriteFailed {
        /// Target path.
        path: PathBuf,
        /// Underlying failure.
        message: String,
    },
}

/// Result type alias for estate operations.
pub type Result<T> = std::result::Result<T, EstateError>;

impl EstateError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is a handler refusal rather than a fault.
    #[must_use]
    pub const fn is_refusal(&self) -> bool {
        matches!(self, Self::Resource(_))
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl ClusterError {
    /// Creates a request error.
    #[must_use]
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates an invalid-response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immutable_message_explains_create_only() {
        let err = EstateError::from(ResourceError::Immutable {
            kind: ResourceKind::Index,
            name: String::from("logs-2024"),
        });
        let message = err.to_string();
        assert!(message.contains("logs-2024"));
        assert!(message.contains("create-only"));
        assert!(err.is_refusal());
    }

    #[test]
    fn test_unsupported_message_names_operation() {
        let err = ResourceError::UnsupportedOperation {
            kind: ResourceKind::Index,
            operation: "delete",
            name: String::from("logs"),
        };
        assert!(err.to_string().contains("Refusing to delete index 'logs'"));
    }

    #[test]
    fn test_fetch_failed_keeps_source() {
        let err = PlanError::FetchFailed {
            kind: ResourceKind::IngestPipeline,
            name: String::from("parse-logs"),
            source: Box::new(ClusterError::request_failed(500, "boom").into()),
        };
        let message = err.to_string();
        assert!(message.starts_with("Failed to fetch ingest_pipelines/parse-logs"));
        assert!(message.contains("500"));
    }
}
