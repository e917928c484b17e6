//! Output formatting for multiple formats
//!
//! JSON and YAML render the serialized model directly. The human format
//! draws a compact summary per run, or a detailed view for a single run.
//!
//! # Example
//!
//! ```ignore
//! use triagebox::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_runs(&service.list_all(), None)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::TriageConfig;
use crate::model::{ActionStatus, Payload, Run};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

#[derive(Serialize)]
struct RunsReport<'a> {
    runs: &'a [Run],
    #[serde(skip_serializing_if = "Option::is_none")]
    flow_log: Option<&'a [String]>,
}

/// Closed sets available for reference.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub categories: Vec<&'static str>,
    pub action_kinds: Vec<&'static str>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a list of analysed runs, optionally with the flow log.
    pub fn format_runs(&self, runs: &[Run], flow_log: Option<&[String]>) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&RunsReport { runs, flow_log })
                .context("Failed to serialize runs to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(&RunsReport { runs, flow_log })
                .context("Failed to serialize runs to YAML"),
            OutputFormat::Human => Ok(self.format_runs_human(runs, flow_log)),
        }
    }

    pub fn format_run(&self, run: &Run) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(run).context("Failed to serialize run to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(run).context("Failed to serialize run to YAML")
            }
            OutputFormat::Human => self.format_run_human(run),
        }
    }

    pub fn format_catalog(&self, catalog: &Catalog) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(catalog)
                .context("Failed to serialize catalog to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(catalog).context("Failed to serialize catalog to YAML")
            }
            OutputFormat::Human => Ok(self.format_catalog_human(catalog)),
        }
    }

    pub fn format_config(&self, config: &TriageConfig) -> Result<String> {
        let config_map: std::collections::BTreeMap<_, _> =
            config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config_map)
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&config_map).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(format!("{}", config)),
        }
    }

    // Human-readable formatting methods

    fn format_runs_human(&self, runs: &[Run], flow_log: Option<&[String]>) -> String {
        let mut output = String::new();

        output.push_str(&format!("Triage Results ({} run(s))\n", runs.len()));
        output.push_str(RULE);
        output.push_str("\n\n");

        for run in runs {
            output.push_str(&summary_block(run));
            output.push('\n');
        }

        if let Some(lines) = flow_log {
            output.push_str("Flow Log:\n");
            for line in lines {
                output.push_str(line);
                output.push('\n');
            }
        }

        output
    }

    fn format_run_human(&self, run: &Run) -> Result<String> {
        let mut output = summary_block(run);

        output.push_str(&format!(
            "\nSource: {} @ {} on {} (build {}, {})\n",
            or_dash(&run.repository),
            or_dash(&run.version),
            or_dash(&run.platform),
            or_dash(&run.build_id),
            or_dash(&run.environment)
        ));
        if !run.tags.is_empty() {
            output.push_str(&format!("Tags: {}\n", run.tags.join(", ")));
        }
        output.push_str(&format!("Rerun Count: {}\n", run.rerun_count));
        output.push_str(&format!(
            "Submitted: {}\n",
            run.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        output.push_str("\nSteps:\n");
        if run.steps.is_empty() {
            output.push_str("  (none found)\n");
        }
        for (i, step) in run.steps.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, step));
        }

        if let Some(ref classifications) = run.analysis.classifications {
            output.push_str("\nClassification Details:\n");
            for candidate in classifications {
                output.push_str(&format!(
                    "\n[{}] {} ({:.2})\n",
                    candidate.classifier_id, candidate.category, candidate.confidence
                ));
                output.push_str(&pretty(&candidate.details)?);
                output.push('\n');
            }
        }

        if let Some(ref results) = run.analysis.action_results {
            output.push_str("\nAction Results:\n");
            for result in results {
                output.push_str(&format!("\n{} [{}]\n", result.kind, status_label(result.status)));
                output.push_str(&pretty(&result.fields)?);
                output.push('\n');
            }
        }

        output.push_str("\nLog:\n");
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&run.logs);
        output.push('\n');

        Ok(output)
    }

    fn format_catalog_human(&self, catalog: &Catalog) -> String {
        let mut output = String::new();

        output.push_str("Triage Catalog\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str("Classification Categories:\n");
        push_tree(&mut output, &catalog.categories);

        output.push_str("\nAction Kinds:\n");
        push_tree(&mut output, &catalog.action_kinds);

        output
    }
}

fn summary_block(run: &Run) -> String {
    let mut output = String::new();

    let symbol = match run.analysis.primary() {
        Some(primary) if primary.category.is_skip() => "\u{2298}",
        Some(primary) if primary.confidence >= 0.9 => "\u{2713}",
        _ => "\u{26A0}",
    };
    output.push_str(&format!("{} {}  {}\n", symbol, run.id, run.test_name));
    if !run.suite.is_empty() {
        output.push_str(&format!("\u{251C}\u{2500} Suite:       {}\n", run.suite));
    }
    output.push_str(&format!("\u{251C}\u{2500} Failed Step: {}\n", run.failed_step));

    match run.analysis.primary() {
        Some(primary) => {
            output.push_str(&format!(
                "\u{251C}\u{2500} Category:    {}  {} {:.0}%\n",
                primary.category,
                confidence_bar(primary.confidence),
                primary.confidence * 100.0
            ));
        }
        None => output.push_str("\u{251C}\u{2500} Category:    (not classified)\n"),
    }

    let actions: Vec<String> = run
        .analysis
        .action_results
        .iter()
        .flatten()
        .map(|r| format!("{} [{}]", r.kind, status_label(r.status)))
        .collect();
    if actions.is_empty() {
        output.push_str("\u{2514}\u{2500} Actions:     (none)\n");
    } else {
        output.push_str(&format!("\u{2514}\u{2500} Actions:     {}\n", actions.join(", ")));
    }

    output
}

fn confidence_bar(confidence: f64) -> String {
    let filled_blocks = ((confidence * 10.0) as usize).min(10);
    "\u{2588}".repeat(filled_blocks) + &"\u{2591}".repeat(10 - filled_blocks)
}

fn status_label(status: ActionStatus) -> &'static str {
    match status {
        ActionStatus::Success => "SUCCESS",
        ActionStatus::Info => "INFO",
    }
}

fn pretty(map: &Payload) -> Result<String> {
    serde_json::to_string_pretty(map).context("Failed to serialize details")
}

fn push_tree(output: &mut String, items: &[&str]) {
    for (i, item) in items.iter().enumerate() {
        let connector = if i + 1 == items.len() {
            "\u{2514}"
        } else {
            "\u{251C}"
        };
        output.push_str(&format!("{}\u{2500} {}\n", connector, item));
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TriageService;
    use crate::model::RunSubmission;

    fn analysed_run() -> Run {
        let service = TriageService::default();
        let id = service.submit(
            RunSubmission::new("test_user_login_timeout", "ERROR: Connection timed out to auth-service")
                .with_suite("Auth"),
        );
        service.get_by_id(&id).unwrap()
    }

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(0.99).chars().filter(|c| *c == '\u{2588}').count(), 9);
        assert_eq!(confidence_bar(1.0).chars().count(), 10);
        assert_eq!(confidence_bar(0.0), "\u{2591}".repeat(10));
    }

    #[test]
    fn test_human_summary() {
        let run = analysed_run();
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_runs(std::slice::from_ref(&run), Some(&["line one".to_string()][..]))
            .unwrap();
        assert!(output.contains("Triage Results (1 run(s))"));
        assert!(output.contains("test_user_login_timeout"));
        assert!(output.contains("Known Flake"));
        assert!(output.contains("Mark for Rerun [INFO]"));
        assert!(output.contains("Flow Log:\nline one"));
    }

    #[test]
    fn test_human_detail_pretty_prints_details() {
        let run = analysed_run();
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_run(&run)
            .unwrap();
        assert!(output.contains("[REGEX_TIMEOUT] Known Flake (0.99)"));
        assert!(output.contains("\"ticket\": \"PROJ-123\""));
        assert!(output.contains("Steps:\n  (none found)"));
    }

    #[test]
    fn test_json_report_omits_absent_flow_log() {
        let run = analysed_run();
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_runs(&[run], None)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value.get("flow_log").is_none());
        assert_eq!(
            value["runs"][0]["analysis"]["classifications"][0]["classification_type"],
            "Known Flake"
        );
        assert_eq!(
            value["runs"][0]["failed_step"],
            "Log analysis did not find a failed step"
        );
    }

    #[test]
    fn test_yaml_catalog() {
        let catalog = Catalog {
            categories: TriageService::list_categories(),
            action_kinds: TriageService::list_action_kinds(),
        };
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_catalog(&catalog)
            .unwrap();
        assert!(output.contains("categories:"));
        assert!(output.contains("- Do Nothing"));

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_catalog(&catalog)
            .unwrap();
        assert!(human.contains("\u{2514}\u{2500} Update Jira Ticket"));
    }

    #[test]
    fn test_config_json_is_sorted_map() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_config(&TriageConfig::builtin())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["dedup_policy"], "last");
    }
}
