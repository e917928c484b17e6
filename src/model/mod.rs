//! Core data model: runs, classification candidates, and actions

mod action;
mod candidate;
mod category;
pub mod id_enum_macro;
mod run;

pub use action::{ActionCommand, ActionKind, ActionResult, ActionStatus};
pub use candidate::ClassificationCandidate;
pub use category::Category;
pub use run::{
    Analysis, AnalysisUpdate, FailedStep, Run, RunId, RunSubmission, NO_FAILED_STEP,
};

/// Free-form key/value mapping used for candidate details and action payloads.
pub type Payload = serde_json::Map<String, serde_json::Value>;
