//! Keyword strategy: plain substring lookups standing in for log understanding

use super::ClassificationStrategy;
use crate::model::{Category, ClassificationCandidate, Run};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub classifier_id: &'static str,
    /// Lowercase substring looked up in the lowercased log.
    pub keyword: &'static str,
    pub category: Category,
    pub confidence: f64,
    pub details: Vec<(&'static str, &'static str)>,
}

pub fn default_keyword_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule {
            classifier_id: "KEYWORD_NPE",
            keyword: "nullpointerexception",
            category: Category::ProductBug,
            confidence: 0.92,
            details: vec![("exception", "NullPointerException")],
        },
        KeywordRule {
            classifier_id: "KEYWORD_PERMS",
            keyword: "permission denied",
            category: Category::InfraError,
            confidence: 0.88,
            details: vec![("error", "Permission denied")],
        },
    ]
}

pub struct KeywordStrategy {
    rules: Vec<KeywordRule>,
}

impl KeywordStrategy {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_keyword_rules())
    }
}

impl ClassificationStrategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn classify(&self, run: &Run) -> Vec<ClassificationCandidate> {
        let logs = run.logs.to_lowercase();

        self.rules
            .iter()
            .filter(|rule| logs.contains(rule.keyword))
            .map(|rule| {
                debug!(classifier_id = rule.classifier_id, "Keyword matched");
                rule.details.iter().fold(
                    ClassificationCandidate::new(
                        rule.classifier_id,
                        rule.category.clone(),
                        rule.confidence,
                    ),
                    |candidate, (key, value)| candidate.with_detail(key, *value),
                )
            })
            .collect()
    }
}
