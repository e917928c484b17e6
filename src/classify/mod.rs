//! Multi-strategy classification with conflict resolution
//!
//! Each [`ClassificationStrategy`] proposes candidates independently. The
//! [`Classifier`] concatenates their output in strategy order and resolves it
//! into the final list:
//!
//! 1. duplicate classifier ids collapse, the later candidate replacing the
//!    earlier one in place;
//! 2. a skip-family candidate, if any survives, becomes the sole result;
//! 3. an empty list becomes a single manual-review candidate at 0.5;
//! 4. otherwise candidates are stably sorted by descending confidence.

pub mod keyword;
pub mod pattern;
pub mod structural;

pub use keyword::KeywordStrategy;
pub use pattern::PatternStrategy;
pub use structural::StructuralStrategy;

use crate::model::{Category, ClassificationCandidate, Run, RunId};
use crate::store::RunStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Classifier id of the synthetic candidate used when nothing matched.
pub const DEFAULT_REVIEW_ID: &str = "DEFAULT_REVIEW";
pub const DEFAULT_REVIEW_CONFIDENCE: f64 = 0.5;

/// One independent classification algorithm.
pub trait ClassificationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Must be a pure function of the run's fields.
    fn classify(&self, run: &Run) -> Vec<ClassificationCandidate>;
}

/// Which merge rule produced the final list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Skip,
    ManualReview,
    Ranked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Every strategy match before resolution, in concatenation order.
    pub raw: Vec<ClassificationCandidate>,
    pub resolution: Resolution,
    pub candidates: Vec<ClassificationCandidate>,
}

pub struct Classifier {
    strategies: Vec<Box<dyn ClassificationStrategy>>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Classifier {
    pub fn new(strategies: Vec<Box<dyn ClassificationStrategy>>) -> Self {
        Self { strategies }
    }

    /// Pattern, keyword, then structural.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(PatternStrategy::with_defaults()),
            Box::new(KeywordStrategy::with_defaults()),
            Box::new(StructuralStrategy::with_defaults()),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Classifies a stored run. Unknown ids yield an empty list.
    ///
    /// All strategies see the same snapshot of the run, taken once.
    pub fn classify(&self, store: &RunStore, id: &RunId) -> Vec<ClassificationCandidate> {
        match store.get(id) {
            Some(run) => self.classify_run(&run).candidates,
            None => {
                debug!(run_id = %id, "Classification requested for unknown run");
                Vec::new()
            }
        }
    }

    pub fn classify_run(&self, run: &Run) -> Classification {
        let raw: Vec<ClassificationCandidate> = self
            .strategies
            .iter()
            .flat_map(|strategy| strategy.classify(run))
            .collect();

        let (resolution, candidates) = resolve(raw.clone());

        info!(
            run_id = %run.id,
            test = %run.test_name,
            ?resolution,
            primary = candidates.first().map(|c| c.category.name()).unwrap_or(""),
            "Run classified"
        );

        Classification {
            raw,
            resolution,
            candidates,
        }
    }
}

/// Resolves concatenated strategy output into the final candidate list.
pub fn resolve(raw: Vec<ClassificationCandidate>) -> (Resolution, Vec<ClassificationCandidate>) {
    let mut candidates = dedup_by_classifier_id(raw);

    if let Some(skip) = candidates.iter().position(ClassificationCandidate::is_skip) {
        let skip = candidates.swap_remove(skip);
        debug!(classifier_id = %skip.classifier_id, "Skip classification overrides all others");
        return (Resolution::Skip, vec![skip]);
    }

    if candidates.is_empty() {
        debug!("No strategy matched, defaulting to manual review");
        return (Resolution::ManualReview, vec![manual_review_candidate()]);
    }

    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    (Resolution::Ranked, candidates)
}

/// Later duplicates replace earlier ones at the earlier position.
fn dedup_by_classifier_id(raw: Vec<ClassificationCandidate>) -> Vec<ClassificationCandidate> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<ClassificationCandidate> = Vec::with_capacity(raw.len());

    for candidate in raw {
        match positions.get(&candidate.classifier_id) {
            Some(&index) => unique[index] = candidate,
            None => {
                positions.insert(candidate.classifier_id.clone(), unique.len());
                unique.push(candidate);
            }
        }
    }

    unique
}

pub fn manual_review_candidate() -> ClassificationCandidate {
    ClassificationCandidate::new(
        DEFAULT_REVIEW_ID,
        Category::NeedsManualReview,
        DEFAULT_REVIEW_CONFIDENCE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RunSubmission;

    fn candidate(id: &str, category: Category, confidence: f64) -> ClassificationCandidate {
        ClassificationCandidate::new(id, category, confidence)
    }

    fn ids(candidates: &[ClassificationCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.classifier_id.as_str()).collect()
    }

    struct FixedStrategy(Vec<ClassificationCandidate>);

    impl ClassificationStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn classify(&self, _run: &Run) -> Vec<ClassificationCandidate> {
            self.0.clone()
        }
    }

    #[test]
    fn test_resolve_empty_gives_manual_review() {
        let (resolution, list) = resolve(vec![]);
        assert_eq!(resolution, Resolution::ManualReview);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].category, Category::NeedsManualReview);
        assert_eq!(list[0].confidence, 0.5);
        assert_eq!(list[0].classifier_id, DEFAULT_REVIEW_ID);
    }

    #[test]
    fn test_resolve_sorts_descending_and_stable() {
        let (resolution, list) = resolve(vec![
            candidate("A", Category::SetupFailure, 0.90),
            candidate("B", Category::KnownFlake, 0.99),
            candidate("C", Category::InfraError, 0.90),
            candidate("D", Category::ProductBug, 0.92),
        ]);
        assert_eq!(resolution, Resolution::Ranked);
        assert_eq!(ids(&list), vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_resolve_zero_confidence_ties_keep_order() {
        let (_, list) = resolve(vec![
            candidate("A", Category::SetupFailure, -0.0),
            candidate("B", Category::InfraError, 0.0),
        ]);
        assert_eq!(ids(&list), vec!["A", "B"]);
    }

    #[test]
    fn test_resolve_later_duplicate_wins_in_place() {
        let (_, list) = resolve(vec![
            candidate("A", Category::SetupFailure, 0.6),
            candidate("B", Category::KnownFlake, 0.6),
            candidate("A", Category::InfraError, 0.6),
        ]);
        assert_eq!(ids(&list), vec!["A", "B"]);
        assert_eq!(list[0].category, Category::InfraError);
    }

    #[test]
    fn test_resolve_skip_is_exclusive_first_wins() {
        let (resolution, list) = resolve(vec![
            candidate("FLAKE", Category::KnownFlake, 0.99),
            candidate("SKIP_FLAG", Category::NewSkip, 0.3),
            candidate("SKIP_ENV", Category::Skip, 1.0),
        ]);
        assert_eq!(resolution, Resolution::Skip);
        assert_eq!(ids(&list), vec!["SKIP_FLAG"]);
    }

    #[test]
    fn test_resolve_skip_replaced_by_later_duplicate_is_not_skip() {
        let (resolution, list) = resolve(vec![
            candidate("X", Category::Skip, 1.0),
            candidate("X", Category::KnownFlake, 0.7),
        ]);
        assert_eq!(resolution, Resolution::Ranked);
        assert_eq!(list[0].category, Category::KnownFlake);
    }

    #[test]
    fn test_classify_unknown_id_is_empty() {
        let store = RunStore::new();
        let classifier = Classifier::with_defaults();
        assert!(classifier.classify(&store, &RunId::from("missing")).is_empty());
    }

    #[test]
    fn test_classify_known_run_is_never_empty() {
        let store = RunStore::new();
        let id = RunId::from("r1");
        store.upsert(Run::from_submission(
            id.clone(),
            RunSubmission::new("test_x", "nothing interesting here"),
        ));
        let list = Classifier::with_defaults().classify(&store, &id);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].category, Category::NeedsManualReview);
    }

    #[test]
    fn test_strategies_concatenate_in_order() {
        let classifier = Classifier::new(vec![
            Box::new(FixedStrategy(vec![candidate("P", Category::SetupFailure, 0.8)])),
            Box::new(FixedStrategy(vec![candidate("K", Category::InfraError, 0.8)])),
        ]);
        let run = Run::from_submission(RunId::from("r"), RunSubmission::new("t", ""));
        let result = classifier.classify_run(&run);
        assert_eq!(ids(&result.raw), vec!["P", "K"]);
        assert_eq!(ids(&result.candidates), vec!["P", "K"]);
    }

    #[test]
    fn test_default_strategy_order() {
        assert_eq!(
            Classifier::with_defaults().strategy_names(),
            vec!["pattern", "keyword", "structural"]
        );
    }
}
