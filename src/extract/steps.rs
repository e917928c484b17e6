//! Step extraction from unstructured test logs

use crate::model::FailedStep;
use serde::{Deserialize, Serialize};

/// Prefix that opens a step line.
pub const STEP_MARKER: &str = "STEP:";

/// Boilerplate steps that never count as a cause of failure (lowercased).
pub const IGNORED_STEP_PHRASES: &[&str] = &[
    "setting up environment",
    "cleaning up resources",
    "starting test",
];

/// Substrings that mark a line as reporting a failure (lowercased).
pub const FAILURE_KEYWORDS: &[&str] = &["fail", "panic", "error", "fatal"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepExtraction {
    pub steps: Vec<String>,
    pub failed_step: FailedStep,
}

/// Returns the step text if `line` is a step marker line.
pub fn step_text(line: &str) -> Option<&str> {
    line.trim_start()
        .strip_prefix(STEP_MARKER)
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

pub fn is_ignored_step(text: &str) -> bool {
    let lower = text.to_lowercase();
    IGNORED_STEP_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

pub fn has_failure_keyword(line: &str) -> bool {
    let lower = line.to_lowercase();
    FAILURE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Collects the non-boilerplate steps and the step active at the first failure line.
///
/// A step line is recorded as the candidate before the same line is checked
/// for failure keywords. Without both a candidate and a failure line the
/// failed step is [`FailedStep::NotFound`].
pub fn extract_steps(logs: &str) -> StepExtraction {
    let mut steps = Vec::new();
    let mut candidate: Option<&str> = None;
    let mut failure_seen = false;

    for line in logs.lines() {
        if let Some(text) = step_text(line).filter(|text| !is_ignored_step(text)) {
            steps.push(text.to_string());
            if !failure_seen {
                candidate = Some(text);
            }
        }

        if !failure_seen && has_failure_keyword(line) {
            failure_seen = true;
        }
    }

    let failed_step = match (failure_seen, candidate) {
        (true, Some(step)) => FailedStep::Found(step.to_string()),
        _ => FailedStep::NotFound,
    };

    StepExtraction { steps, failed_step }
}
