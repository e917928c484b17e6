//! Logging-based progress handler

use super::{ProgressHandler, TriageEvent};
use crate::model::ActionStatus;
use crate::rules::RuleOutcome;
use tracing::{debug, info};

/// Handler that logs pipeline events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &TriageEvent) {
        match event {
            TriageEvent::BatchStarted { runs } => {
                info!(runs, "Starting triage batch");
            }
            TriageEvent::RunStarted { run_id, test_name } => {
                info!(run_id = %run_id, test = %test_name, "Processing run");
            }
            TriageEvent::StepsExtracted {
                run_id,
                steps,
                failed_step,
            } => {
                debug!(
                    run_id = %run_id,
                    steps,
                    failed_step = failed_step.as_deref().unwrap_or("-"),
                    "Steps extracted"
                );
            }
            TriageEvent::CandidateMatched {
                run_id,
                classifier_id,
                category,
            } => {
                debug!(run_id = %run_id, classifier_id = %classifier_id, category = %category, "Match found");
            }
            TriageEvent::SkipOverride {
                run_id,
                classifier_id,
            } => {
                info!(run_id = %run_id, classifier_id = %classifier_id, "Skip classification overrides others");
            }
            TriageEvent::ManualReviewDefault { run_id } => {
                info!(run_id = %run_id, "No match, defaulting to manual review");
            }
            TriageEvent::RulesApplied {
                run_id,
                candidates,
                outcome,
                matched,
            } => match outcome {
                RuleOutcome::Matched => {
                    debug!(run_id = %run_id, candidates, matched = ?matched, "Rules matched");
                }
                RuleOutcome::Skip | RuleOutcome::Default => {
                    debug!(run_id = %run_id, candidates, ?outcome, "Rules applied");
                }
            },
            TriageEvent::ActionExecuted {
                run_id,
                action,
                status,
            } => {
                let status = match status {
                    ActionStatus::Success => "success",
                    ActionStatus::Info => "info",
                };
                debug!(run_id = %run_id, action = %action, status, "Action executed");
            }
            TriageEvent::RunCompleted { run_id, duration } => {
                debug!(run_id = %run_id, duration_ms = duration.as_millis(), "Run complete");
            }
            TriageEvent::BatchCompleted { runs, duration } => {
                info!(runs, duration_ms = duration.as_millis(), "Triage batch complete");
            }
        }
    }
}
