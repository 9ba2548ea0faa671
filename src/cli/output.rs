//! Output formatting for CLI commands.
//!
//! This module renders plans and reports for the terminal or as JSON.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

use crate::config::{ProjectConfig, ValidationResult};
use crate::error::ValidationError;
use crate::export::ExportReport;
use crate::resources::ResourceKind;
use crate::planner::{
    Action, ApplyReport, ChangeTag, ItemResult, NarrativeLine, Plan, PlanItem,
};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Summary row for the plan table.
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Count")]
    count: usize,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a plan for display.
    #[must_use]
    pub fn format_plan(&self, plan: &Plan) -> String {
        match self.format {
            OutputFormat::Json => to_json(&PlanJson::from(plan)),
            OutputFormat::Text => Self::format_plan_text(plan),
        }
    }

    fn format_plan_text(plan: &Plan) -> String {
        if !plan.has_changes() {
            return format!(
                "{} No changes. Resources on '{}' match the local documents.\n",
                "✓".green(),
                plan.cluster_name.cyan()
            );
        }

        let mut output = String::new();
        let _ = write!(
            output,
            "\nPlan for cluster: {} (generated {})\n\n",
            plan.cluster_name.cyan().bold(),
            plan.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let rows = vec![
            SummaryRow {
                action: "Create".green().to_string(),
                count: plan.count(Action::Create),
            },
            SummaryRow {
                action: "Update".yellow().to_string(),
                count: plan.count(Action::Update),
            },
            SummaryRow {
                action: "Unchanged".dimmed().to_string(),
                count: plan.count(Action::NoChange),
            },
        ];
        output.push_str(&Table::new(rows).to_string());
        output.push_str("\n\n");

        for item in plan.actionable() {
            Self::write_item(&mut output, item);
        }

        let _ = writeln!(
            output,
            "Total: {} to create, {} to update, {} unchanged.",
            plan.count(Action::Create).to_string().green(),
            plan.count(Action::Update).to_string().yellow(),
            plan.count(Action::NoChange)
        );
        output
    }

    fn write_item(output: &mut String, item: &PlanItem) {
        let header = match item.action {
            Action::Create => format!("+ {}", item.label()).green().bold(),
            Action::Update => format!("~ {}", item.label()).yellow().bold(),
            Action::NoChange => format!("  {}", item.label()).dimmed(),
        };
        let _ = writeln!(output, "  {header}");
        for line in item.narrative.lines() {
            let _ = writeln!(output, "      {}", Self::format_line(line));
        }
        output.push('\n');
    }

    fn format_line(line: &NarrativeLine) -> String {
        match line.tag {
            ChangeTag::Added => line.text.green().to_string(),
            ChangeTag::Removed => line.text.red().to_string(),
            ChangeTag::Changed => line.text.yellow().to_string(),
        }
    }

    /// Formats an apply report.
    #[must_use]
    pub fn format_apply(&self, report: &ApplyReport) -> String {
        if self.format == OutputFormat::Json {
            return to_json(&ApplyJson {
                success: report.all_succeeded(),
                succeeded: report.succeeded(),
                failed: report.failed(),
                results: &report.results,
            });
        }

        let mut output = String::new();
        for result in &report.results {
            match &result.error {
                None => {
                    let _ = writeln!(
                        output,
                        "  {} {} ({})",
                        "OK".green().bold(),
                        result.label(),
                        result.action.past_tense()
                    );
                }
                Some(error) => {
                    let _ = writeln!(
                        output,
                        "  {} {}: {error}",
                        "FAIL".red().bold(),
                        result.label()
                    );
                }
            }
        }

        if report.all_succeeded() {
            let _ = writeln!(
                output,
                "\n{} Apply complete: {} succeeded.",
                "✓".green(),
                report.succeeded()
            );
        } else {
            let _ = writeln!(
                output,
                "\n{} Apply finished with errors: {} succeeded, {} failed.",
                "✗".red(),
                report.succeeded(),
                report.failed()
            );
        }
        output
    }

    /// Formats an export report.
    #[must_use]
    pub fn format_export(&self, report: &ExportReport) -> String {
        if self.format == OutputFormat::Json {
            return to_json(report);
        }

        let mut output = String::new();
        for exported in &report.exported {
            let _ = writeln!(
                output,
                "  {} {}/{} -> {}",
                "+".green(),
                exported.kind,
                exported.name,
                exported.path.display()
            );
        }
        for skipped in &report.skipped {
            let _ = writeln!(
                output,
                "  {} {}/{} ({})",
                "-".dimmed(),
                skipped.kind,
                skipped.name,
                skipped.reason
            );
        }
        let _ = writeln!(
            output,
            "\nExported {} resources from '{}', skipped {}.",
            report.exported.len(),
            report.cluster_name,
            report.skipped.len()
        );
        output
    }

    /// Formats the outcome of `validate`.
    #[must_use]
    pub fn format_validation(
        &self,
        config: &ProjectConfig,
        result: &ValidationResult,
        resource_count: usize,
        problems: &[ValidationError],
    ) -> String {
        if self.format == OutputFormat::Json {
            return to_json(&ValidationJson {
                valid: problems.is_empty(),
                clusters: config.clusters.keys().cloned().collect(),
                resource_dir: &config.resource_dir,
                resources: resource_count,
                warnings: &result.warnings,
                errors: problems.iter().map(ToString::to_string).collect(),
            });
        }

        let mut output = String::new();
        let names: Vec<&str> = config.clusters.keys().map(String::as_str).collect();
        let _ = writeln!(output, "Clusters: {}", names.join(", "));
        let _ = writeln!(output, "Resource directory: {}", config.resource_dir.display());

        for warning in &result.warnings {
            let _ = writeln!(output, "{} {warning}", "⚠".yellow());
        }
        for problem in problems {
            let _ = writeln!(output, "{} {problem}", "✗".red());
        }

        if problems.is_empty() {
            let _ = writeln!(
                output,
                "{} Configuration and {resource_count} resource files are valid.",
                "✓".green()
            );
        } else {
            let _ = writeln!(
                output,
                "{} {} of {} resource files are invalid.",
                "✗".red(),
                problems.len(),
                resource_count
            );
        }
        output
    }

    /// Formats the outcome of `init`.
    #[must_use]
    pub fn format_init(&self, directory: &Path, created: &[PathBuf]) -> String {
        if self.format == OutputFormat::Json {
            return to_json(&serde_json::json!({
                "directory": directory,
                "created": created,
            }));
        }

        if created.is_empty() {
            return format!(
                "Project in {} is already initialized.\n",
                directory.display()
            );
        }

        let mut output = String::new();
        for path in created {
            let _ = writeln!(output, "  {} {}", "created".green(), path.display());
        }
        let _ = writeln!(output, "\nNext steps:");
        let _ = writeln!(output, "  1. Edit clusters.yaml with your cluster URL and credentials");
        let _ = writeln!(output, "  2. Run 'estate validate' to check your documents");
        let _ = writeln!(output, "  3. Run 'estate plan --cluster local' to preview changes");
        output
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

// JSON serialization helpers

#[derive(Serialize)]
struct PlanJson<'a> {
    cluster: &'a str,
    created_at: DateTime<Utc>,
    summary: SummaryJson,
    items: Vec<PlanItemJson<'a>>,
}

#[derive(Serialize)]
struct SummaryJson {
    creates: usize,
    updates: usize,
    unchanged: usize,
}

#[derive(Serialize)]
struct PlanItemJson<'a> {
    name: &'a str,
    kind: ResourceKind,
    action: Action,
    changes: &'a [NarrativeLine],
}

impl<'a> From<&'a Plan> for PlanJson<'a> {
    fn from(plan: &'a Plan) -> Self {
        Self {
            cluster: &plan.cluster_name,
            created_at: plan.created_at,
            summary: SummaryJson {
                creates: plan.count(Action::Create),
                updates: plan.count(Action::Update),
                unchanged: plan.count(Action::NoChange),
            },
            items: plan
                .actionable()
                .into_iter()
                .map(|item| PlanItemJson {
                    name: &item.name,
                    kind: item.kind,
                    action: item.action,
                    changes: item.narrative.lines(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ApplyJson<'a> {
    success: bool,
    succeeded: usize,
    failed: usize,
    results: &'a [ItemResult],
}

#[derive(Serialize)]
struct ValidationJson<'a> {
    valid: bool,
    clusters: Vec<String>,
    resource_dir: &'a Path,
    resources: usize,
    warnings: &'a [String],
    errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportedResource, SkippedResource};
    use crate::planner::Narrative;
    use crate::resources::JsonObject;

    fn plan() -> Plan {
        let mut body = JsonObject::new();
        body.insert(String::from("priority"), serde_json::json!(100));
        Plan::new(
            "prod",
            vec![
                PlanItem {
                    name: String::from("logs"),
                    kind: ResourceKind::IndexTemplate,
                    action: Action::Create,
                    narrative: Narrative::for_create(&body),
                    body: Some(body),
                },
                PlanItem {
                    name: String::from("logs-000001"),
                    kind: ResourceKind::Index,
                    action: Action::NoChange,
                    body: None,
                    narrative: Narrative::default(),
                },
            ],
        )
    }

    #[test]
    fn test_plan_text_lists_actionable_items() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text).format_plan(&plan());

        assert!(text.contains("Plan for cluster: prod (generated "));
        assert!(text.contains("+ index_templates/logs"));
        assert!(text.contains("+ root['priority']: 100"));
        assert!(!text.contains("indices/logs-000001"));
        assert!(text.contains("Total: 1 to create, 0 to update, 1 unchanged."));
    }

    #[test]
    fn test_plan_json_shape() {
        let json = OutputFormatter::new(OutputFormat::Json).format_plan(&plan());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["cluster"], "prod");
        assert!(value["created_at"].is_string());
        assert_eq!(value["summary"]["creates"], 1);
        assert_eq!(value["summary"]["unchanged"], 1);
        assert_eq!(value["items"].as_array().unwrap().len(), 1);
        assert_eq!(value["items"][0]["kind"], "index_templates");
        assert_eq!(value["items"][0]["changes"][0]["tag"], "added");
    }

    #[test]
    fn test_empty_plan_text() {
        colored::control::set_override(false);
        let text = OutputFormatter::new(OutputFormat::Text).format_plan(&Plan::new("dev", vec![]));
        assert!(text.contains("No changes"));
    }

    #[test]
    fn test_apply_report_lines() {
        colored::control::set_override(false);
        let report = ApplyReport {
            results: vec![
                ItemResult {
                    name: String::from("parse-logs"),
                    kind: ResourceKind::IngestPipeline,
                    action: Action::Create,
                    success: true,
                    error: None,
                },
                ItemResult {
                    name: String::from("logs-000001"),
                    kind: ResourceKind::Index,
                    action: Action::Update,
                    success: false,
                    error: Some(String::from("index 'logs-000001' already exists")),
                },
            ],
        };

        let text = OutputFormatter::new(OutputFormat::Text).format_apply(&report);
        assert!(text.contains("OK ingest_pipelines/parse-logs (created)"));
        assert!(text.contains("FAIL indices/logs-000001: index 'logs-000001' already exists"));
        assert!(text.contains("1 succeeded, 1 failed"));

        let json = OutputFormatter::new(OutputFormat::Json).format_apply(&report);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["results"][1]["kind"], "indices");
    }

    #[test]
    fn test_json_outputs_share_kind_spelling() {
        let report = ExportReport {
            cluster_name: String::from("prod"),
            exported: vec![ExportedResource {
                kind: ResourceKind::IndexTemplate,
                name: String::from("logs"),
                path: PathBuf::from("index_templates/logs.json"),
            }],
            skipped: vec![SkippedResource {
                kind: ResourceKind::Index,
                name: String::from("logs-000001"),
                reason: String::from("file already exists"),
            }],
        };
        let formatter = OutputFormatter::new(OutputFormat::Json);

        let export: serde_json::Value =
            serde_json::from_str(&formatter.format_export(&report)).unwrap();
        let plan: serde_json::Value =
            serde_json::from_str(&formatter.format_plan(&plan())).unwrap();

        assert_eq!(export["exported"][0]["kind"], plan["items"][0]["kind"]);
        assert_eq!(export["skipped"][0]["kind"], "indices");
    }
}
