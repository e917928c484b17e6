use super::id_gen::{IdGenerator, UuidGenerator};
use crate::model::{ActionCommand, ActionKind, ActionResult, ActionStatus, Payload};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_CHANNEL: &str = "#default";
pub const ARTIFACT_BASE_URL: &str = "http://artifacts.example.com/cleanup/";

/// Simulates remediation actions. Every command yields exactly one result and
/// nothing here can fail.
#[derive(Clone)]
pub struct ActionExecutor {
    ids: Arc<dyn IdGenerator>,
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(Arc::new(UuidGenerator))
    }
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor").finish_non_exhaustive()
    }
}

impl ActionExecutor {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn execute_all(&self, commands: &[ActionCommand]) -> Vec<ActionResult> {
        commands.iter().map(|cmd| self.execute(cmd)).collect()
    }

    pub fn execute(&self, command: &ActionCommand) -> ActionResult {
        debug!(action = %command.kind, "Executing action");

        let mut fields = Payload::new();
        let status = match &command.kind {
            ActionKind::CreateJiraTicket => {
                let ticket = format!("PROJ-{}", self.ids.hex(4).to_uppercase());
                fields.insert("ticket_id".to_string(), Value::String(ticket));
                ActionStatus::Success
            }
            ActionKind::NotifySlack => {
                let channel = command.payload_str("channel").unwrap_or(DEFAULT_CHANNEL);
                fields.insert("message_sent_to".to_string(), json!(channel));
                ActionStatus::Success
            }
            ActionKind::RunCustomScript => {
                let script = command.payload.get("script_path").cloned().unwrap_or(Value::Null);
                let label = script.as_str().unwrap_or("script");
                fields.insert("logs".to_string(), json!(cleanup_transcript(label)));
                fields.insert(
                    "artifacts".to_string(),
                    json!({
                        "report_url": format!("{}{}.html", ARTIFACT_BASE_URL, self.ids.hex(8)),
                    }),
                );
                fields.insert("script".to_string(), script);
                ActionStatus::Success
            }
            other => {
                fields.insert(
                    "message".to_string(),
                    json!(format!("Action '{}' recorded.", other.name())),
                );
                ActionStatus::Info
            }
        };

        ActionResult {
            kind: command.kind.clone(),
            status,
            fields,
        }
    }
}

fn cleanup_transcript(script: &str) -> String {
    [
        format!("Executing {}...", script),
        "Connecting to cluster...".to_string(),
        "Found 3 stale pods.".to_string(),
        "Pod 'test-pod-123' deleted.".to_string(),
        "Pod 'test-pod-456' deleted.".to_string(),
        "Pod 'test-pod-789' deleted.".to_string(),
        "Script finished.".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SequentialIdGenerator;

    fn executor() -> ActionExecutor {
        ActionExecutor::new(Arc::new(SequentialIdGenerator::starting_at(0xab)))
    }

    #[test]
    fn test_jira_ticket_id_is_deterministic() {
        let result = executor().execute(&ActionCommand::new(ActionKind::CreateJiraTicket));
        assert_eq!(result.status, ActionStatus::Success);
        assert_eq!(result.field_str("ticket_id"), Some("PROJ-00AB"));
    }

    #[test]
    fn test_slack_channel_and_default() {
        let exec = executor();
        let sent = exec.execute(&ActionCommand::new(ActionKind::NotifySlack).with("channel", "#storage-team"));
        assert_eq!(sent.field_str("message_sent_to"), Some("#storage-team"));

        let fallback = exec.execute(&ActionCommand::new(ActionKind::NotifySlack));
        assert_eq!(fallback.field_str("message_sent_to"), Some(DEFAULT_CHANNEL));
    }

    #[test]
    fn test_custom_script_result() {
        let result = executor().execute(
            &ActionCommand::new(ActionKind::RunCustomScript)
                .with("script_path", "/scripts/cleanup_stale_resources.sh"),
        );
        assert_eq!(result.status, ActionStatus::Success);
        assert_eq!(result.field_str("script"), Some("/scripts/cleanup_stale_resources.sh"));
        let logs = result.field_str("logs").unwrap();
        assert!(logs.starts_with("Executing /scripts/cleanup_stale_resources.sh..."));
        assert!(logs.ends_with("Script finished."));
        assert_eq!(
            result.fields["artifacts"]["report_url"],
            "http://artifacts.example.com/cleanup/000000ab.html"
        );
    }

    #[test]
    fn test_other_kinds_are_recorded() {
        let exec = executor();
        for kind in [
            ActionKind::MarkForRerun,
            ActionKind::MarkForManualReview,
            ActionKind::UpdateJiraTicket,
            ActionKind::DoNothing,
            ActionKind::Other("Page On-Call".to_string()),
        ] {
            let result = exec.execute(&ActionCommand::new(kind.clone()));
            assert_eq!(result.status, ActionStatus::Info);
            assert_eq!(
                result.field_str("message").map(str::to_string),
                Some(format!("Action '{}' recorded.", kind.name()))
            );
        }
    }

    #[test]
    fn test_one_result_per_command_in_order() {
        let commands = vec![
            ActionCommand::new(ActionKind::MarkForRerun),
            ActionCommand::new(ActionKind::CreateJiraTicket),
        ];
        let results = executor().execute_all(&commands);
        let kinds: Vec<_> = results.iter().map(|r| r.kind.clone()).collect();
        assert_eq!(kinds, vec![ActionKind::MarkForRerun, ActionKind::CreateJiraTicket]);
    }
}
