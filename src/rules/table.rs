//! Ordered category to action table

use crate::model::{ActionCommand, ActionKind, Category, ClassificationCandidate, Run};

pub const PRODUCT_CHANNEL: &str = "#dev-team";
pub const STORAGE_CHANNEL: &str = "#storage-team";
pub const ANSIBLE_CHANNEL: &str = "#devops-ansible";
pub const CLEANUP_SCRIPT: &str = "/scripts/cleanup_stale_resources.sh";

/// Settings consulted by conditional rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSettings {
    /// Reruns an infrastructure error may request. Zero turns the request off.
    pub max_reruns: u32,
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self { max_reruns: 0 }
    }
}

pub type ActionBuilder = fn(&Run, &ClassificationCandidate, &RuleSettings) -> Vec<ActionCommand>;

/// Entry of the rule table; fires for every candidate of `category`.
#[derive(Clone)]
pub struct ActionRule {
    pub category: Category,
    pub actions: ActionBuilder,
}

impl ActionRule {
    pub fn new(category: Category, actions: ActionBuilder) -> Self {
        Self { category, actions }
    }
}

impl std::fmt::Debug for ActionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRule")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

pub fn default_action_rules() -> Vec<ActionRule> {
    vec![
        ActionRule::new(Category::ProductBug, product_bug),
        ActionRule::new(Category::BackupIntegrityFailure, backup_integrity),
        ActionRule::new(Category::AnsibleDeployFailure, ansible_deploy),
        ActionRule::new(Category::KnownFlake, known_flake),
        ActionRule::new(Category::InfraError, infra_error),
    ]
}

fn product_bug(run: &Run, _: &ClassificationCandidate, _: &RuleSettings) -> Vec<ActionCommand> {
    vec![
        ActionCommand::new(ActionKind::CreateJiraTicket).with("test_name", run.test_name.as_str()),
        ActionCommand::new(ActionKind::NotifySlack).with("channel", PRODUCT_CHANNEL),
    ]
}

fn backup_integrity(
    _: &Run,
    candidate: &ClassificationCandidate,
    _: &RuleSettings,
) -> Vec<ActionCommand> {
    vec![ActionCommand::new(ActionKind::NotifySlack)
        .with("channel", STORAGE_CHANNEL)
        .with("details", serde_json::Value::Object(candidate.details.clone()))]
}

fn ansible_deploy(
    _: &Run,
    candidate: &ClassificationCandidate,
    _: &RuleSettings,
) -> Vec<ActionCommand> {
    let role = candidate.detail_str("failed_role").unwrap_or("unknown");
    vec![ActionCommand::new(ActionKind::NotifySlack)
        .with("channel", ANSIBLE_CHANNEL)
        .with("failed_role", role)]
}

fn known_flake(_: &Run, _: &ClassificationCandidate, _: &RuleSettings) -> Vec<ActionCommand> {
    vec![ActionCommand::new(ActionKind::MarkForRerun).with("reason", "Known flaky test")]
}

fn infra_error(
    run: &Run,
    _: &ClassificationCandidate,
    settings: &RuleSettings,
) -> Vec<ActionCommand> {
    let mut actions = vec![
        ActionCommand::new(ActionKind::RunCustomScript).with("script_path", CLEANUP_SCRIPT),
        ActionCommand::new(ActionKind::MarkForManualReview)
            .with("reason", "Infrastructure instability"),
    ];
    if run.rerun_count < settings.max_reruns {
        actions.push(
            ActionCommand::new(ActionKind::MarkForRerun)
                .with("reason", "Infrastructure error, rerun budget available")
                .with("rerun_count", run.rerun_count),
        );
    }
    actions
}
