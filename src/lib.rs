// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// Tests unwrap and panic freely
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

// ============================================================================
// Crate Documentation
// ============================================================================

//! # estate
//!
//! Declarative, idempotent management of Elasticsearch cluster resources.
//!
//! ## Overview
//!
//! Resources are kept as JSON documents in a project directory, one file per
//! resource, and reconciled against a live cluster:
//!
//! - Index templates, component templates, ILM policies and ingest pipelines
//!   are created or replaced in place
//! - Indices are created once; their mappings and settings are create-only
//! - Every change is previewed as a structural diff before it is applied
//!
//! ## Architecture
//!
//! 1. **Desired State**: JSON documents under the resource directory
//! 2. **Current State**: fetched and normalized by a [`ResourceHandler`] per kind
//! 3. **Planner**: compares the two through the [`DiffEngine`] into a [`Plan`]
//! 4. **Applier**: writes every actionable item, reporting each on its own
//!
//! ## Modules
//!
//! - [`config`]: Cluster configuration parsing and validation
//! - [`cluster`]: HTTP client for the Elasticsearch REST API
//! - [`resources`]: Resource kinds, normalization and per-kind handlers
//! - [`loader`]: Desired-resource discovery from disk
//! - [`planner`]: Structural diff, plan generation and application
//! - [`export`]: Writing live resources back to documents
//! - [`scaffold`]: Starter project layout
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! clusters:
//!   local:
//!     url: http://localhost:9200
//!     auth:
//!       type: basic
//!       username: elastic
//!       password: ${ES_PASSWORD}
//!
//! resource_dir: resources
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod cluster;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod planner;
pub mod resources;
pub mod scaffold;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use cluster::ClusterClient;
pub use config::{ConfigParser, ConfigValidator, ProjectConfig};
pub use error::{EstateError, Result};
pub use export::{ExportReport, Exporter};
pub use loader::ResourceLoader;
pub use planner::{Action, Applier, ApplyReport, DiffEngine, DiffResult, Plan, PlanItem, Planner};
pub use resources::{ClusterHandlers, DesiredResource, HandlerRegistry, ResourceHandler, ResourceKind};
