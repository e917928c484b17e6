//! Per-run triage pipeline and the management operations built on it
//!
//! A run flows through the stages in a fixed order:
//!
//! 1. the store receives the new record;
//! 2. the step extractor writes `steps` and `failed_step`;
//! 3. the classifier resolves strategy output into candidates;
//! 4. the rule engine records classifications and actions;
//! 5. the executor's results are merged into the analysis.
//!
//! Batches run one submission at a time.

pub mod orchestrator;
pub mod service;

pub use orchestrator::TriagePipeline;
pub use service::TriageService;
