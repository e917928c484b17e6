//! Structural strategy: test name plus failed step, for failures the log text alone
//! does not identify

use super::ClassificationStrategy;
use crate::model::{Category, ClassificationCandidate, Run};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct StructuralRule {
    pub classifier_id: &'static str,
    pub test_name_contains: &'static str,
    pub failed_step_contains: &'static str,
    pub category: Category,
    pub confidence: f64,
    pub reason: &'static str,
}

impl StructuralRule {
    fn matches(&self, test_name: &str, failed_step: &str) -> bool {
        test_name.contains(self.test_name_contains)
            && failed_step.contains(self.failed_step_contains)
    }
}

pub fn default_structural_rules() -> Vec<StructuralRule> {
    vec![
        StructuralRule {
            classifier_id: "STEP_BACKUP_INTEGRITY",
            test_name_contains: "test_mysql_backup",
            failed_step_contains: "Verify backup integrity",
            category: Category::BackupIntegrityFailure,
            confidence: 1.0,
            reason: "Checksum mismatch on restored data",
        },
        StructuralRule {
            classifier_id: "STEP_OCP_MYSQL_DEPLOY",
            test_name_contains: "test_ocp_mysql_deploy",
            failed_step_contains: "Deploying ocp-mysql",
            category: Category::OcpMysqlDeployFailure,
            confidence: 0.90,
            reason: "Deployment step failed before the application came up",
        },
    ]
}

pub struct StructuralStrategy {
    rules: Vec<StructuralRule>,
}

impl StructuralStrategy {
    pub fn new(rules: Vec<StructuralRule>) -> Self {
        Self { rules }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_structural_rules())
    }
}

impl ClassificationStrategy for StructuralStrategy {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn classify(&self, run: &Run) -> Vec<ClassificationCandidate> {
        let Some(failed_step) = run.failed_step.as_found() else {
            return Vec::new();
        };

        self.rules
            .iter()
            .filter(|rule| rule.matches(&run.test_name, failed_step))
            .map(|rule| {
                debug!(classifier_id = rule.classifier_id, failed_step, "Structural rule matched");
                ClassificationCandidate::new(rule.classifier_id, rule.category.clone(), rule.confidence)
                    .with_detail("reason", rule.reason)
                    .with_detail("failed_step", failed_step)
            })
            .collect()
    }
}
