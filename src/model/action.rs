use super::Payload;
use serde::{Deserialize, Serialize};

crate::define_triage_enum! {
    /// Remediation or notification operation derived from a classification
    ActionKind {
        CreateJiraTicket => "Create Jira Ticket",
        UpdateJiraTicket => "Update Jira Ticket",
        NotifySlack => "Notify Slack",
        MarkForRerun => "Mark for Rerun",
        MarkForManualReview => "Mark for Manual Review",
        RunCustomScript => "Run Custom Script" | "Execute Custom Script",
        DoNothing => "Do Nothing",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCommand {
    #[serde(rename = "action_type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub payload: Payload,
}

impl ActionCommand {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            payload: Payload::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionStatus {
    Success,
    Info,
}

/// Recorded outcome of one executed [`ActionCommand`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    #[serde(rename = "action_type")]
    pub kind: ActionKind,
    pub status: ActionStatus,
    #[serde(flatten)]
    pub fields: Payload,
}

impl ActionResult {
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_script_alias() {
        assert_eq!(
            ActionKind::from_name("Execute Custom Script"),
            Some(ActionKind::RunCustomScript)
        );
        assert_eq!(ActionKind::RunCustomScript.name(), "Run Custom Script");
    }

    #[test]
    fn test_command_builder() {
        let cmd = ActionCommand::new(ActionKind::NotifySlack).with("channel", "#dev-team");
        assert_eq!(cmd.payload_str("channel"), Some("#dev-team"));
        assert_eq!(cmd.payload_str("missing"), None);
    }

    #[test]
    fn test_result_flattens_fields() {
        let mut fields = Payload::new();
        fields.insert("ticket_id".to_string(), json!("PROJ-0A1B"));
        let result = ActionResult {
            kind: ActionKind::CreateJiraTicket,
            status: ActionStatus::Success,
            fields,
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["action_type"], "Create Jira Ticket");
        assert_eq!(value["status"], "SUCCESS");
        assert_eq!(value["ticket_id"], "PROJ-0A1B");
    }
}
