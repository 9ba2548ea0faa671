//! CLI module for estate.
//!
//! This module provides the command-line interface for planning and
//! applying Elasticsearch resource changes.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, ResourceFilter};
pub use output::OutputFormatter;
