use crate::actions::{ActionExecutor, IdGenerator, UuidGenerator};
use crate::audit::AuditLogger;
use crate::classify::{Classifier, Resolution};
use crate::config::TriageConfig;
use crate::extract::extract_steps;
use crate::model::{AnalysisUpdate, ClassificationCandidate, Run, RunId, RunSubmission};
use crate::progress::{NoOpHandler, ProgressHandler, TriageEvent};
use crate::rules::RuleEngine;
use crate::store::RunStore;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_LOG_BYTES: usize = 1_048_576;

/// Drives submissions through extraction, classification, rules and
/// execution, writing each stage's output into the store it is handed.
pub struct TriagePipeline {
    classifier: Classifier,
    rules: RuleEngine,
    executor: ActionExecutor,
    ids: Arc<dyn IdGenerator>,
    progress: Arc<dyn ProgressHandler>,
    audit: AuditLogger,
    max_log_bytes: usize,
}

impl Default for TriagePipeline {
    fn default() -> Self {
        let ids: Arc<dyn IdGenerator> = Arc::new(UuidGenerator);
        Self {
            classifier: Classifier::with_defaults(),
            rules: RuleEngine::default(),
            executor: ActionExecutor::new(Arc::clone(&ids)),
            ids,
            progress: Arc::new(NoOpHandler),
            audit: AuditLogger::disabled(),
            max_log_bytes: DEFAULT_MAX_LOG_BYTES,
        }
    }
}

impl TriagePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TriageConfig) -> Self {
        Self {
            rules: RuleEngine::with_settings(config.rule_settings(), config.dedup_policy),
            audit: AuditLogger::new(config.audit_file.clone()),
            max_log_bytes: config.max_log_bytes,
            ..Self::default()
        }
    }

    /// Replaces the generator used for run ids and action result tokens.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.executor = ActionExecutor::new(Arc::clone(&ids));
        self.ids = ids;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_rule_engine(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_max_log_bytes(mut self, max_log_bytes: usize) -> Self {
        self.max_log_bytes = max_log_bytes;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Processes every submission in order after clearing the store.
    pub fn process_batch(&self, store: &RunStore, submissions: Vec<RunSubmission>) -> Vec<RunId> {
        let start = Instant::now();
        store.clear();
        self.progress.on_progress(&TriageEvent::BatchStarted {
            runs: submissions.len(),
        });

        let ids: Vec<RunId> = submissions
            .into_iter()
            .map(|submission| self.process(store, submission))
            .collect();

        self.progress.on_progress(&TriageEvent::BatchCompleted {
            runs: ids.len(),
            duration: start.elapsed(),
        });
        info!(runs = ids.len(), "Batch processed");
        ids
    }

    /// Runs one submission through every stage and returns its id.
    pub fn process(&self, store: &RunStore, mut submission: RunSubmission) -> RunId {
        let start = Instant::now();
        let id = match submission.id.take() {
            Some(id) => id,
            None => self.fresh_run_id(store),
        };
        truncate_logs(&id, &mut submission.logs, self.max_log_bytes);

        if store.contains(&id) {
            warn!(run_id = %id, "Run id already stored, replacing previous record");
        }
        let test_name = submission.test_name.clone();
        store.upsert(Run::from_submission(id.clone(), submission));
        self.progress.on_progress(&TriageEvent::RunStarted {
            run_id: id.clone(),
            test_name,
        });

        self.extract(store, &id);
        let Some(run) = store.get(&id) else {
            warn!(run_id = %id, "Run vanished from store mid-pipeline");
            return id;
        };

        let candidates = self.classify(&run);
        let decision = self.timed("rules", &id, &candidates, || {
            self.rules.apply(store, &run, &candidates)
        });
        self.progress.on_progress(&TriageEvent::RulesApplied {
            run_id: id.clone(),
            candidates: candidates.len(),
            outcome: decision.outcome,
            matched: decision.matched.iter().map(|c| c.name().to_string()).collect(),
        });

        let results = self.timed("execute", &id, &decision.actions, || {
            self.executor.execute_all(&decision.actions)
        });
        for result in &results {
            self.progress.on_progress(&TriageEvent::ActionExecuted {
                run_id: id.clone(),
                action: result.kind.name().to_string(),
                status: result.status,
            });
        }
        store.merge_analysis(&id, AnalysisUpdate::results(results));

        self.progress.on_progress(&TriageEvent::RunCompleted {
            run_id: id.clone(),
            duration: start.elapsed(),
        });
        id
    }

    /// Draws generated ids until one is not already taken by a stored run.
    fn fresh_run_id(&self, store: &RunStore) -> RunId {
        loop {
            let id = RunId::new(self.ids.run_id());
            if !store.contains(&id) {
                return id;
            }
            debug!(run_id = %id, "Generated run id already stored, drawing another");
        }
    }

    fn extract(&self, store: &RunStore, id: &RunId) {
        let Some(logs) = store.get(id).map(|r| r.logs) else {
            return;
        };

        let extraction = self.timed("extract", id, &logs, || extract_steps(&logs));
        self.progress.on_progress(&TriageEvent::StepsExtracted {
            run_id: id.clone(),
            steps: extraction.steps.len(),
            failed_step: extraction.failed_step.as_found().map(str::to_string),
        });
        store.record_steps(id, extraction.steps, extraction.failed_step);
    }

    fn classify(&self, run: &Run) -> Vec<ClassificationCandidate> {
        let input = json!({
            "test_name": run.test_name,
            "failed_step": run.failed_step,
        });
        let classification = self.timed("classify", &run.id, &input, || {
            self.classifier.classify_run(run)
        });

        for candidate in &classification.raw {
            self.progress.on_progress(&TriageEvent::CandidateMatched {
                run_id: run.id.clone(),
                classifier_id: candidate.classifier_id.clone(),
                category: candidate.category.name().to_string(),
            });
        }
        match classification.resolution {
            Resolution::Skip => {
                let classifier_id = classification
                    .candidates
                    .first()
                    .map(|c| c.classifier_id.clone())
                    .unwrap_or_default();
                self.progress.on_progress(&TriageEvent::SkipOverride {
                    run_id: run.id.clone(),
                    classifier_id,
                });
            }
            Resolution::ManualReview => {
                self.progress.on_progress(&TriageEvent::ManualReviewDefault {
                    run_id: run.id.clone(),
                });
            }
            Resolution::Ranked => {}
        }

        classification.candidates
    }

    /// Runs one stage and audits its input and output with the elapsed time.
    fn timed<I, O, F>(&self, stage: &str, id: &RunId, input: &I, f: F) -> O
    where
        I: serde::Serialize,
        O: serde::Serialize,
        F: FnOnce() -> O,
    {
        let start = Instant::now();
        let output = f();
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(stage, run_id = %id, latency_ms, "Stage complete");
        self.audit.log_stage(stage, id.as_str(), input, &output, latency_ms);
        output
    }
}

/// Cuts `logs` to at most `max_bytes`, backing off to a char boundary.
fn truncate_logs(id: &RunId, logs: &mut String, max_bytes: usize) {
    if logs.len() <= max_bytes {
        return;
    }

    let mut cut = max_bytes;
    while !logs.is_char_boundary(cut) {
        cut -= 1;
    }
    warn!(
        run_id = %id,
        original_bytes = logs.len(),
        kept_bytes = cut,
        "Log exceeds size limit, truncating"
    );
    logs.truncate(cut);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SequentialIdGenerator;
    use crate::model::{ActionKind, Category, FailedStep};
    use crate::progress::RecordingHandler;
    use crate::rules::RuleOutcome;

    fn pipeline() -> TriagePipeline {
        TriagePipeline::new().with_id_generator(Arc::new(SequentialIdGenerator::new()))
    }

    #[test]
    fn test_process_populates_every_stage() {
        let store = RunStore::new();
        let id = pipeline().process(
            &store,
            RunSubmission::new(
                "test_mysql_backup_and_verify",
                "STEP: Setting up environment\nSTEP: Verify backup integrity\nFAIL: Checksum mismatch",
            ),
        );

        let run = store.get(&id).unwrap();
        assert_eq!(id.as_str(), "run-0000");
        assert_eq!(run.steps, vec!["Verify backup integrity"]);
        assert_eq!(
            run.failed_step,
            FailedStep::Found("Verify backup integrity".to_string())
        );
        let primary = run.analysis.primary().unwrap();
        assert_eq!(primary.category, Category::BackupIntegrityFailure);
        let actions = run.analysis.actions.unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::NotifySlack);
        let results = run.analysis.action_results.unwrap();
        assert_eq!(results[0].field_str("message_sent_to"), Some("#storage-team"));
    }

    #[test]
    fn test_submission_id_is_kept() {
        let store = RunStore::new();
        let id = pipeline().process(&store, RunSubmission::new("t", "").with_id("given-id"));
        assert_eq!(id.as_str(), "given-id");
        assert!(store.contains(&id));
    }

    #[test]
    fn test_batch_resets_store_and_keeps_order() {
        let store = RunStore::new();
        let pipeline = pipeline();
        pipeline.process(&store, RunSubmission::new("stale", ""));

        let ids = pipeline.process_batch(
            &store,
            vec![
                RunSubmission::new("first", "ERROR: Connection timed out"),
                RunSubmission::new("second", "all good"),
            ],
        );

        let names: Vec<_> = store.list().into_iter().map(|r| r.test_name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_flow_log_for_skip() {
        let store = RunStore::new();
        let recorder = Arc::new(RecordingHandler::new());
        let pipeline = pipeline().with_progress(recorder.clone());

        pipeline.process_batch(
            &store,
            vec![RunSubmission::new(
                "test_feature_x_flow",
                "STEP: Checking feature flag\nINFO: Skipping test, feature flag is disabled\nERROR: Connection timed out",
            )],
        );

        let lines = recorder.lines();
        assert!(lines[0].starts_with("Starting new triage batch"));
        assert!(lines.contains(&"--- Processing Test: test_feature_x_flow ---".to_string()));
        assert!(lines.iter().any(|l| l.contains("Match found: REGEX_SKIP_FLAG")));
        assert!(lines.iter().any(|l| l.contains("Overriding others")));
        assert!(lines.iter().any(|l| l.ends_with("Executing: Do Nothing")));
        assert!(lines.last().unwrap().starts_with("Triage complete: 1 run(s)"));
    }

    #[test]
    fn test_rules_event_reports_default() {
        struct Capture(std::sync::Mutex<Vec<TriageEvent>>);
        impl ProgressHandler for Capture {
            fn on_progress(&self, event: &TriageEvent) {
                self.0.lock().unwrap().push(event.clone());
            }
        }

        let capture = Arc::new(Capture(std::sync::Mutex::new(Vec::new())));
        let store = RunStore::new();
        pipeline()
            .with_progress(capture.clone())
            .process(&store, RunSubmission::new("t", "ERROR: Failed during database migration setup"));

        let events = capture.0.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            TriageEvent::RulesApplied { outcome: RuleOutcome::Default, candidates: 1, .. }
        )));
    }

    #[test]
    fn test_generated_id_never_overwrites_stored_run() {
        let store = RunStore::new();
        let pipeline = pipeline();
        pipeline.process(&store, RunSubmission::new("explicit", "").with_id("run-0000"));

        let id = pipeline.process(&store, RunSubmission::new("generated", ""));
        assert_eq!(id.as_str(), "run-0001");
        assert_eq!(store.get(&RunId::from("run-0000")).unwrap().test_name, "explicit");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_custom_classifier_is_used() {
        use crate::classify::KeywordStrategy;

        let pipeline = pipeline()
            .with_classifier(Classifier::new(vec![Box::new(KeywordStrategy::with_defaults())]));
        assert_eq!(pipeline.classifier().strategy_names(), vec!["keyword"]);

        let store = RunStore::new();
        let id = pipeline.process(
            &store,
            RunSubmission::new("t", "ERROR: Connection timed out\nFATAL: java.lang.NullPointerException"),
        );
        let classifications = store.get(&id).unwrap().analysis.classifications.unwrap();
        assert_eq!(classifications.len(), 1);
        assert_eq!(classifications[0].classifier_id, "KEYWORD_NPE");
    }

    #[test]
    fn test_audit_records_every_stage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("audit.jsonl");
        let store = RunStore::new();
        pipeline()
            .with_audit(AuditLogger::new(Some(path.clone())))
            .process(&store, RunSubmission::new("t", "FATAL: panic"));

        let stages: Vec<String> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|line| {
                let entry: serde_json::Value = serde_json::from_str(line).unwrap();
                entry["stage"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(stages, vec!["extract", "classify", "rules", "execute"]);
    }

    #[test]
    fn test_truncate_logs_on_char_boundary() {
        let id = RunId::from("r");
        let mut logs = "ab\u{00e9}cd".to_string();
        truncate_logs(&id, &mut logs, 3);
        assert_eq!(logs, "ab");

        let mut short = "abc".to_string();
        truncate_logs(&id, &mut short, 10);
        assert_eq!(short, "abc");
    }

    #[test]
    fn test_oversized_log_truncated_before_classification() {
        let store = RunStore::new();
        let mut logs = "x".repeat(2048);
        logs.push_str("\nERROR: Connection timed out");
        let id = pipeline()
            .with_max_log_bytes(1024)
            .process(&store, RunSubmission::new("t", logs));

        let run = store.get(&id).unwrap();
        assert_eq!(run.logs.len(), 1024);
        assert_eq!(
            run.analysis.primary().unwrap().category,
            Category::NeedsManualReview
        );
    }
}
