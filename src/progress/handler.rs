//! Progress handler trait and events

use crate::model::{ActionStatus, RunId};
use crate::rules::RuleOutcome;
use std::time::Duration;

/// Decision points of the triage pipeline, in the order they occur for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum TriageEvent {
    BatchStarted {
        runs: usize,
    },

    RunStarted {
        run_id: RunId,
        test_name: String,
    },

    StepsExtracted {
        run_id: RunId,
        steps: usize,
        failed_step: Option<String>,
    },

    /// One raw strategy match, before conflict resolution
    CandidateMatched {
        run_id: RunId,
        classifier_id: String,
        category: String,
    },

    SkipOverride {
        run_id: RunId,
        classifier_id: String,
    },

    ManualReviewDefault {
        run_id: RunId,
    },

    RulesApplied {
        run_id: RunId,
        candidates: usize,
        outcome: RuleOutcome,
        matched: Vec<String>,
    },

    ActionExecuted {
        run_id: RunId,
        action: String,
        status: ActionStatus,
    },

    RunCompleted {
        run_id: RunId,
        duration: Duration,
    },

    BatchCompleted {
        runs: usize,
        duration: Duration,
    },
}

impl TriageEvent {
    /// Human-readable flow-log line, if the event has one.
    pub fn flow_line(&self) -> Option<String> {
        let line = match self {
            TriageEvent::BatchStarted { runs } => {
                format!("Starting new triage batch of {} run(s)...", runs)
            }
            TriageEvent::RunStarted { test_name, .. } => {
                format!("--- Processing Test: {} ---", test_name)
            }
            TriageEvent::StepsExtracted {
                steps, failed_step, ..
            } => match failed_step {
                Some(step) => format!("   [StepExtractor] {} step(s), failed at '{}'", steps, step),
                None => format!("   [StepExtractor] {} step(s), no failed step found", steps),
            },
            TriageEvent::CandidateMatched {
                classifier_id,
                category,
                ..
            } => format!("   [Classifier] Match found: {} ({})", classifier_id, category),
            TriageEvent::SkipOverride { .. } => {
                "   [Classifier] Exclusive 'skip' classification found. Overriding others."
                    .to_string()
            }
            TriageEvent::ManualReviewDefault { .. } => {
                "   [Classifier] No specific match. Defaulting to Needs Manual Review.".to_string()
            }
            TriageEvent::RulesApplied {
                candidates,
                outcome,
                matched,
                ..
            } => match outcome {
                RuleOutcome::Skip => {
                    "   [RuleEngine] Rule matched: Skip test. Action: Do Nothing.".to_string()
                }
                RuleOutcome::Default => format!(
                    "   [RuleEngine] {} classification(s), no rule matched. Action: Mark for Manual Review.",
                    candidates
                ),
                RuleOutcome::Matched => format!(
                    "   [RuleEngine] {} classification(s), rules matched: {}",
                    candidates,
                    matched.join(", ")
                ),
            },
            TriageEvent::ActionExecuted { action, .. } => {
                format!("   [ActionExecutor] Executing: {}", action)
            }
            TriageEvent::RunCompleted { .. } => return None,
            TriageEvent::BatchCompleted { runs, .. } => {
                format!("Triage complete: {} run(s) processed.", runs)
            }
        };
        Some(line)
    }
}

/// Receives pipeline events as they happen
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &TriageEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &TriageEvent) {}
}
