//! Pattern strategy: ordered regex table matched against the raw log

use super::ClassificationStrategy;
use crate::model::{Category, ClassificationCandidate, Run};
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

/// How a matching entry fills in its candidate details.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternDetail {
    Fixed,
    /// Stores the last `/`-separated segment of capture group 1 under `key`.
    CaptureLastSegment { key: &'static str },
}

#[derive(Debug, Clone)]
pub struct PatternSpec {
    pub classifier_id: &'static str,
    pub pattern: String,
    pub category: Category,
    pub confidence: f64,
    pub detail: PatternDetail,
    pub fixed_details: Vec<(&'static str, &'static str)>,
}

impl PatternSpec {
    /// Matches a literal phrase anywhere in the log.
    pub fn phrase(
        classifier_id: &'static str,
        phrase: &str,
        category: Category,
        confidence: f64,
    ) -> Self {
        Self {
            classifier_id,
            pattern: regex::escape(phrase),
            category,
            confidence,
            detail: PatternDetail::Fixed,
            fixed_details: Vec::new(),
        }
    }

    pub fn capture(
        classifier_id: &'static str,
        pattern: &str,
        category: Category,
        confidence: f64,
        key: &'static str,
    ) -> Self {
        Self {
            classifier_id,
            pattern: pattern.to_string(),
            category,
            confidence,
            detail: PatternDetail::CaptureLastSegment { key },
            fixed_details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: &'static str, value: &'static str) -> Self {
        self.fixed_details.push((key, value));
        self
    }
}

/// Log shape emitted by the deployment playbook runner. The role path may sit
/// inside JSON-escaped quotes.
pub const ANSIBLE_ROLE_FAILURE: &str =
    r#"ansible-playbook error: one or more host failed.*use_role\\*"\s*:\s*\\*"([^"\\]+)"#;

pub fn default_pattern_specs() -> Vec<PatternSpec> {
    vec![
        PatternSpec::phrase("REGEX_TIMEOUT", "Connection timed out", Category::KnownFlake, 0.99)
            .with_detail("ticket", "PROJ-123"),
        PatternSpec::phrase(
            "REGEX_DB_MIGRATE",
            "database migration setup",
            Category::SetupFailure,
            0.95,
        )
        .with_detail("error", "DB migration failed"),
        PatternSpec::phrase(
            "REGEX_MYSQL_VALIDATE",
            "mysql validation failed",
            Category::OcpMysqlValidationFailure,
            0.96,
        )
        .with_detail("reason", "Validation script returned non-zero"),
        PatternSpec::phrase(
            "REGEX_MYSQL_CLEANUP",
            "mysql cleanup failed",
            Category::OcpMysqlCleanupFailure,
            0.96,
        )
        .with_detail("reason", "Cleanup script returned non-zero"),
        PatternSpec::phrase(
            "REGEX_MYSQL_DEPLOY",
            "ocp-mysql deploy failed",
            Category::OcpMysqlDeployFailure,
            0.97,
        )
        .with_detail("reason", "Deployment playbook failed"),
        PatternSpec::phrase(
            "REGEX_BACKUP_PARTIAL",
            "backup completed with warnings",
            Category::BackupPartiallyFailed,
            0.90,
        )
        .with_detail("warning", "Some files were skipped"),
        PatternSpec::phrase(
            "REGEX_BACKUP_SUCCESS",
            "backup successful",
            Category::BackupSuccessful,
            1.0,
        ),
        PatternSpec::phrase(
            "REGEX_SKIP_ENV",
            "Test skipped due to unstable environment",
            Category::Skip,
            1.0,
        )
        .with_detail("reason", "Unstable Environment"),
        PatternSpec::phrase(
            "REGEX_SKIP_FLAG",
            "Skipping test, feature flag is disabled",
            Category::NewSkip,
            1.0,
        )
        .with_detail("reason", "Feature Flag Disabled"),
        PatternSpec::capture(
            "REGEX_ANSIBLE_FAILURE",
            ANSIBLE_ROLE_FAILURE,
            Category::AnsibleDeployFailure,
            0.98,
            "failed_role",
        )
        .with_detail("error_type", "Host Failed"),
    ]
}

struct PatternRule {
    spec: PatternSpec,
    regex: Regex,
}

pub struct PatternStrategy {
    rules: Vec<PatternRule>,
}

impl PatternStrategy {
    pub fn with_defaults() -> Self {
        Self::new(default_pattern_specs())
    }

    /// Compiles the table case-insensitively with `.` matching newlines.
    /// Entries that fail to compile are dropped with a warning.
    pub fn new(specs: Vec<PatternSpec>) -> Self {
        let rules = specs
            .into_iter()
            .filter_map(|spec| {
                match RegexBuilder::new(&spec.pattern)
                    .case_insensitive(true)
                    .dot_matches_new_line(true)
                    .build()
                {
                    Ok(regex) => Some(PatternRule { spec, regex }),
                    Err(e) => {
                        warn!(
                            classifier_id = spec.classifier_id,
                            error = %e,
                            "Skipping pattern that failed to compile"
                        );
                        None
                    }
                }
            })
            .collect();

        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn candidate_for(rule: &PatternRule, logs: &str) -> Option<ClassificationCandidate> {
        let spec = &rule.spec;
        let mut candidate =
            ClassificationCandidate::new(spec.classifier_id, spec.category.clone(), spec.confidence);

        match &spec.detail {
            PatternDetail::Fixed => {
                if !rule.regex.is_match(logs) {
                    return None;
                }
            }
            PatternDetail::CaptureLastSegment { key } => {
                let captures = rule.regex.captures(logs)?;
                let path = captures.get(1)?.as_str();
                candidate = candidate.with_detail(key, last_path_segment(path));
            }
        }

        for (key, value) in &spec.fixed_details {
            candidate = candidate.with_detail(key, *value);
        }
        Some(candidate)
    }
}

fn last_path_segment(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

impl ClassificationStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn classify(&self, run: &Run) -> Vec<ClassificationCandidate> {
        self.rules
            .iter()
            .filter_map(|rule| Self::candidate_for(rule, &run.logs))
            .inspect(|c| debug!(classifier_id = %c.classifier_id, "Pattern matched"))
            .collect()
    }
}
