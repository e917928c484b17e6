use super::table::{default_action_rules, ActionRule, RuleSettings};
use crate::model::{
    ActionCommand, ActionKind, AnalysisUpdate, Category, ClassificationCandidate, Run,
};
use crate::store::RunStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

pub const DEFAULT_RULE_REASON: &str = "No specific rule matched";

/// Which payload survives when two candidates produce the same action kind.
/// Either way the kind keeps the position of its first appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    #[default]
    Last,
    First,
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last" | "last-wins" => Ok(Self::Last),
            "first" | "first-wins" => Ok(Self::First),
            other => Err(format!("unknown dedup policy '{}'", other)),
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Last => f.write_str("last"),
            Self::First => f.write_str("first"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    /// Primary candidate is in the skip family.
    Skip,
    Matched,
    /// No candidate had a table entry.
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDecision {
    pub outcome: RuleOutcome,
    /// Categories that fired a table entry, once each, in candidate order.
    pub matched: Vec<Category>,
    pub actions: Vec<ActionCommand>,
}

#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<ActionRule>,
    settings: RuleSettings,
    dedup: DedupPolicy,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(default_action_rules(), RuleSettings::default(), DedupPolicy::default())
    }
}

impl RuleEngine {
    pub fn new(rules: Vec<ActionRule>, settings: RuleSettings, dedup: DedupPolicy) -> Self {
        Self {
            rules,
            settings,
            dedup,
        }
    }

    pub fn with_settings(settings: RuleSettings, dedup: DedupPolicy) -> Self {
        Self::new(default_action_rules(), settings, dedup)
    }

    pub fn dedup_policy(&self) -> DedupPolicy {
        self.dedup
    }

    /// Evaluates the rules and records classifications and actions on the
    /// stored run. Existing action results are left in place.
    pub fn apply(
        &self,
        store: &RunStore,
        run: &Run,
        classifications: &[ClassificationCandidate],
    ) -> RuleDecision {
        let decision = self.evaluate(run, classifications);
        store.merge_analysis(
            &run.id,
            AnalysisUpdate::decision(classifications.to_vec(), decision.actions.clone()),
        );
        decision
    }

    pub fn evaluate(&self, run: &Run, classifications: &[ClassificationCandidate]) -> RuleDecision {
        if classifications.first().is_some_and(ClassificationCandidate::is_skip) {
            debug!(run_id = %run.id, "Skip classification, no actions taken");
            return RuleDecision {
                outcome: RuleOutcome::Skip,
                matched: Vec::new(),
                actions: vec![ActionCommand::new(ActionKind::DoNothing)],
            };
        }

        let mut matched: Vec<Category> = Vec::new();
        let mut collected: Vec<ActionCommand> = Vec::new();

        for candidate in classifications {
            for rule in self.rules.iter().filter(|r| r.category == candidate.category) {
                let actions = (rule.actions)(run, candidate, &self.settings);
                debug!(
                    category = %candidate.category,
                    classifier_id = %candidate.classifier_id,
                    count = actions.len(),
                    "Rule matched"
                );
                if !matched.contains(&candidate.category) {
                    matched.push(candidate.category.clone());
                }
                collected.extend(actions);
            }
        }

        let outcome = if collected.is_empty() {
            collected.push(
                ActionCommand::new(ActionKind::MarkForManualReview)
                    .with("reason", DEFAULT_RULE_REASON),
            );
            RuleOutcome::Default
        } else {
            RuleOutcome::Matched
        };

        let actions = dedup_by_kind(collected, self.dedup);
        info!(
            run_id = %run.id,
            ?outcome,
            actions = actions.len(),
            "Rules evaluated"
        );

        RuleDecision {
            outcome,
            matched,
            actions,
        }
    }
}

/// One command per kind, kinds ordered by first appearance.
pub fn dedup_by_kind(actions: Vec<ActionCommand>, policy: DedupPolicy) -> Vec<ActionCommand> {
    let mut positions: HashMap<ActionKind, usize> = HashMap::new();
    let mut unique: Vec<ActionCommand> = Vec::with_capacity(actions.len());

    for action in actions {
        match positions.get(&action.kind) {
            Some(&index) => {
                if policy == DedupPolicy::Last {
                    unique[index] = action;
                }
            }
            None => {
                positions.insert(action.kind.clone(), unique.len());
                unique.push(action);
            }
        }
    }

    unique
}
