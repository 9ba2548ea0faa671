//! estate CLI entrypoint.
//!
//! This is the main entrypoint for the estate command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use estate::cli::{Cli, Commands, OutputFormat, OutputFormatter, ResourceFilter};
use estate::cluster::ClusterClient;
use estate::config::{ConfigParser, ConfigValidator, ProjectConfig, ValidationResult};
use estate::error::Result;
use estate::export::Exporter;
use estate::loader::ResourceLoader;
use estate::planner::{Applier, Plan, Planner};
use estate::resources::ClusterHandlers;
use estate::scaffold::scaffold_project;

use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// How a successful run ended, mapped to the process exit code.
enum Outcome {
    /// Nothing pending, or everything applied.
    Success,
    /// A plan found changes to make.
    ChangesPending,
    /// Some items failed or some documents are invalid.
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => Self::SUCCESS,
            Outcome::Failed => Self::from(1),
            Outcome::ChangesPending => Self::from(2),
        }
    }
}

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<Outcome> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Init { directory } => cmd_init(&directory, &formatter),
        Commands::Validate { filter } => cmd_validate(&cli.config, &filter, &formatter),
        Commands::Plan { cluster, filter } => {
            cmd_plan(&cli.config, &cluster, &filter, &formatter).await
        }
        Commands::Apply {
            cluster,
            filter,
            yes,
        } => cmd_apply(&cli.config, &cluster, &filter, yes, cli.output, &formatter).await,
        Commands::Export {
            cluster,
            output_dir,
            filter,
            force,
        } => cmd_export(&cli.config, &cluster, output_dir, &filter, force, &formatter).await,
    }
}

/// Create a starter project.
fn cmd_init(directory: &Path, formatter: &OutputFormatter) -> Result<Outcome> {
    info!("Initializing project in: {}", directory.display());
    let created = scaffold_project(directory)?;
    print!("{}", formatter.format_init(directory, &created));
    Ok(Outcome::Success)
}

/// Validate configuration and resource documents.
fn cmd_validate(
    config_path: &Path,
    filter: &ResourceFilter,
    formatter: &OutputFormatter,
) -> Result<Outcome> {
    let (config, validation) = load_config(config_path)?;
    let loader = resource_loader(config.resource_dir.clone(), filter);

    let problems = loader.validate()?;
    let count = loader.file_count()?;
    print!(
        "{}",
        formatter.format_validation(&config, &validation, count, &problems)
    );

    Ok(if problems.is_empty() {
        Outcome::Success
    } else {
        Outcome::Failed
    })
}

/// Show pending changes.
async fn cmd_plan(
    config_path: &Path,
    cluster: &str,
    filter: &ResourceFilter,
    formatter: &OutputFormatter,
) -> Result<Outcome> {
    let (config, _) = load_config(config_path)?;
    let handlers = connect(&config, cluster).await?;
    let plan = build_plan(&config, cluster, filter, &handlers).await?;

    print!("{}", formatter.format_plan(&plan));

    Ok(if plan.has_changes() {
        Outcome::ChangesPending
    } else {
        Outcome::Success
    })
}

/// Apply pending changes.
async fn cmd_apply(
    config_path: &Path,
    cluster: &str,
    filter: &ResourceFilter,
    auto_approve: bool,
    format: OutputFormat,
    formatter: &OutputFormatter,
) -> Result<Outcome> {
    let (config, _) = load_config(config_path)?;
    let handlers = connect(&config, cluster).await?;
    let plan = build_plan(&config, cluster, filter, &handlers).await?;

    if !plan.has_changes() {
        print!("{}", formatter.format_plan(&plan));
        return Ok(Outcome::Success);
    }

    if format == OutputFormat::Text {
        print!("{}", formatter.format_plan(&plan));
    }

    if !auto_approve && !confirm(cluster)? {
        eprintln!("Apply cancelled.");
        return Ok(Outcome::Success);
    }

    let report = Applier::new(&handlers).apply(&plan).await;
    print!("{}", formatter.format_apply(&report));

    Ok(if report.all_succeeded() {
        Outcome::Success
    } else {
        Outcome::Failed
    })
}

/// Export live resources to local documents.
async fn cmd_export(
    config_path: &Path,
    cluster: &str,
    output_dir: Option<PathBuf>,
    filter: &ResourceFilter,
    force: bool,
    formatter: &OutputFormatter,
) -> Result<Outcome> {
    let (config, _) = load_config(config_path)?;
    let handlers = connect(&config, cluster).await?;
    let output_dir = output_dir.unwrap_or_else(|| config.resource_dir.clone());

    let report = Exporter::new(&handlers, output_dir)
        .with_force(force)
        .export(cluster, &filter.types, &filter.names())
        .await?;
    print!("{}", formatter.format_export(&report));

    Ok(Outcome::Success)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads `.env`, parses and validates the configuration file.
fn load_config(config_path: &Path) -> Result<(ProjectConfig, ValidationResult)> {
    let parser = ConfigParser::new()
        .with_base_path(config_path.parent().unwrap_or_else(|| Path::new(".")));
    parser.load_dotenv()?;

    let config = parser.load_file(config_path)?;
    let validation = ConfigValidator::new().validate(&config)?;
    for warning in &validation.warnings {
        debug!("Configuration warning: {warning}");
    }

    Ok((config, validation))
}

/// Builds handlers for `cluster` and checks that it answers.
async fn connect(config: &ProjectConfig, cluster: &str) -> Result<ClusterHandlers> {
    let cluster_config = config.cluster(cluster)?;
    let client = ClusterClient::new(cluster_config)?;

    let banner = client.info().await?;
    info!(
        "Connected to '{cluster}' at {} (version {})",
        client.base_url(),
        banner["version"]["number"].as_str().unwrap_or("unknown")
    );

    Ok(ClusterHandlers::new(&client))
}

fn resource_loader(resource_dir: PathBuf, filter: &ResourceFilter) -> ResourceLoader {
    ResourceLoader::new(resource_dir)
        .with_kinds(filter.types.iter().copied())
        .with_names(filter.resources.iter().cloned())
}

/// Loads desired resources and plans them against the cluster.
async fn build_plan(
    config: &ProjectConfig,
    cluster: &str,
    filter: &ResourceFilter,
    handlers: &ClusterHandlers,
) -> Result<Plan> {
    let desired = resource_loader(config.resource_dir.clone(), filter).discover()?;
    debug!("Loaded {} desired resources", desired.len());
    Planner::new(handlers).generate_plan(cluster, &desired).await
}

/// Asks for confirmation on stderr.
fn confirm(cluster: &str) -> Result<bool> {
    eprint!("Apply these changes to '{cluster}'? [y/N]: ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
