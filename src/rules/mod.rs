//! Category to action rules
//!
//! The table is an ordered list of `(category, action builder)` pairs. Every
//! candidate of a run is looked up in order and the collected commands are
//! deduplicated by kind under a [`DedupPolicy`].

pub mod engine;
pub mod table;

pub use engine::{dedup_by_kind, DedupPolicy, RuleDecision, RuleEngine, RuleOutcome};
pub use table::{default_action_rules, ActionRule, RuleSettings};
