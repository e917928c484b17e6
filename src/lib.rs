//! triagebox - rule-driven triage of CI test-failure logs
//!
//! Given the raw log of one failed test run, triagebox works out the most
//! likely root-cause category and the remediation actions that category
//! implies, then records a simulated execution of those actions.
//!
//! # Core Concepts
//!
//! - **Step extraction**: `STEP:` markers and the first failure keyword locate
//!   the step that failed
//! - **Classification**: pattern, keyword and structural strategies each
//!   propose candidates; a skip candidate overrides everything, and no match
//!   at all falls back to manual review
//! - **Rules**: each candidate's category maps to an ordered action list,
//!   deduplicated by action kind
//! - **Execution**: actions are simulated and their results merged back into
//!   the run's analysis
//!
//! # Example Usage
//!
//! ```
//! use triagebox::{Category, RunSubmission, TriageService};
//!
//! let service = TriageService::default();
//! let id = service.submit(RunSubmission::new(
//!     "test_calculate_invoice",
//!     "FATAL: java.lang.NullPointerException",
//! ));
//!
//! let run = service.get_by_id(&id).unwrap();
//! assert_eq!(run.analysis.primary().unwrap().category, Category::ProductBug);
//! ```
//!
//! # Project Structure
//!
//! - [`extract`]: failed-step extraction
//! - [`classify`]: classification strategies and conflict resolution
//! - [`rules`]: category-to-action rule engine
//! - [`actions`]: simulated action execution
//! - [`store`]: shared run record store
//! - [`pipeline`]: per-run orchestration and the management operations
//! - [`progress`]: triage flow events and handlers

pub mod actions;
pub mod audit;
pub mod classify;
pub mod cli;
pub mod config;
pub mod extract;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod rules;
pub mod store;
pub mod util;

pub use actions::{ActionExecutor, IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use audit::AuditLogger;
pub use classify::{Classification, ClassificationStrategy, Classifier, Resolution};
pub use config::{ConfigError, TriageConfig};
pub use ingest::{demo_submissions, load_submissions, IngestError};
pub use model::{
    ActionCommand, ActionKind, ActionResult, ActionStatus, Analysis, Category,
    ClassificationCandidate, FailedStep, Run, RunId, RunSubmission,
};
pub use pipeline::{TriagePipeline, TriageService};
pub use progress::{ProgressHandler, RecordingHandler, TriageEvent};
pub use rules::{DedupPolicy, RuleDecision, RuleEngine, RuleOutcome};
pub use store::RunStore;
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
