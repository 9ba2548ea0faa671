//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::resources::ResourceKind;

/// estate - Declarative Elasticsearch resource management.
#[derive(Parser, Debug)]
#[command(name = "estate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the cluster configuration file.
    #[arg(short, long, global = true, env = "ESTATE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a starter project.
    Init {
        /// Directory to initialize.
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,
    },

    /// Validate the cluster configuration and resource documents.
    Validate {
        /// Resource selection.
        #[command(flatten)]
        filter: ResourceFilter,
    },

    /// Show what would change on a cluster.
    Plan {
        /// Target cluster name from the configuration file.
        #[arg(long)]
        cluster: String,

        /// Resource selection.
        #[command(flatten)]
        filter: ResourceFilter,
    },

    /// Apply pending changes to a cluster.
    Apply {
        /// Target cluster name from the configuration file.
        #[arg(long)]
        cluster: String,

        /// Resource selection.
        #[command(flatten)]
        filter: ResourceFilter,

        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Write live cluster resources to local documents.
    Export {
        /// Source cluster name from the configuration file.
        #[arg(long)]
        cluster: String,

        /// Directory to write into (defaults to the resource directory).
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Resource selection.
        #[command(flatten)]
        filter: ResourceFilter,

        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
}

/// Resource kind and name selection shared by several commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ResourceFilter {
    /// Only these resource types (e.g. index_templates). Repeatable.
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub types: Vec<ResourceKind>,

    /// Only resources with these names. Repeatable.
    #[arg(short = 'r', long = "resource", value_name = "NAME")]
    pub resources: Vec<String>,
}

impl ResourceFilter {
    /// Selected names as a set. Empty means all.
    #[must_use]
    pub fn names(&self) -> BTreeSet<String> {
        self.resources.iter().cloned().collect()
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
