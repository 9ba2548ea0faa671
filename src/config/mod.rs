//! Configuration module for estate.
//!
//! This module handles all configuration-related functionality:
//! - Parsing and deserializing `clusters.yaml`
//! - `${VAR}` interpolation and `.env` loading
//! - Validation of cluster definitions

mod parser;
mod spec;
mod validator;

pub use parser::{ConfigParser, DEFAULT_CONFIG_FILE};
pub use spec::{AuthConfig, ClusterConfig, ProjectConfig, TlsConfig};
pub use self::validator::{ConfigValidator, ValidationIssue, ValidationResult};
