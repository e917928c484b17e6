use super::{Category, Payload};
use serde::{Deserialize, Serialize};

/// One strategy's proposed root cause for a run.
///
/// `classifier_id` names the rule that fired and is unique within a run's
/// final candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationCandidate {
    pub classifier_id: String,
    #[serde(rename = "classification_type")]
    pub category: Category,
    pub confidence: f64,
    #[serde(default)]
    pub details: Payload,
}

impl ClassificationCandidate {
    /// Confidence is clamped into `[0, 1]`; NaN and `-0.0` become `0.0`.
    pub fn new(classifier_id: impl Into<String>, category: Category, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() || confidence == 0.0 {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Self {
            classifier_id: classifier_id.into(),
            category,
            confidence,
            details: Payload::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(|v| v.as_str())
    }

    pub fn is_skip(&self) -> bool {
        self.category.is_skip()
    }
}
