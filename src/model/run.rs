use super::{ActionCommand, ActionResult, ClassificationCandidate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Text recorded in place of a failed step when the log does not reveal one.
pub const NO_FAILED_STEP: &str = "Log analysis did not find a failed step";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Test run report as handed over by the ingestion side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RunId>,
    pub test_name: String,
    #[serde(default)]
    pub suite: String,
    #[serde(default)]
    pub build_id: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub logs: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rerun_count: u32,
}

impl RunSubmission {
    pub fn new(test_name: impl Into<String>, logs: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            logs: logs.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<RunId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    pub fn with_build(mut self, build_id: impl Into<String>, environment: impl Into<String>) -> Self {
        self.build_id = build_id.into();
        self.environment = environment.into();
        self
    }

    pub fn with_source(
        mut self,
        version: impl Into<String>,
        repository: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        self.version = version.into();
        self.repository = repository.into();
        self.platform = platform.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rerun_count(mut self, rerun_count: u32) -> Self {
        self.rerun_count = rerun_count;
        self
    }
}

/// Step the log points at as the cause of failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FailedStep {
    Found(String),
    #[default]
    NotFound,
}

impl FailedStep {
    pub fn as_found(&self) -> Option<&str> {
        match self {
            FailedStep::Found(step) => Some(step),
            FailedStep::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FailedStep::Found(_))
    }
}

impl fmt::Display for FailedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_found().unwrap_or(NO_FAILED_STEP))
    }
}

impl Serialize for FailedStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_found().unwrap_or(NO_FAILED_STEP))
    }
}

impl<'de> Deserialize<'de> for FailedStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(match s {
            Some(step) if step != NO_FAILED_STEP => FailedStep::Found(step),
            _ => FailedStep::NotFound,
        })
    }
}

/// Analysis sub-record, filled in stage by stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifications: Option<Vec<ClassificationCandidate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionCommand>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_results: Option<Vec<ActionResult>>,
}

/// Partial analysis; only `Some` fields are written by [`Analysis::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisUpdate {
    pub classifications: Option<Vec<ClassificationCandidate>>,
    pub actions: Option<Vec<ActionCommand>>,
    pub action_results: Option<Vec<ActionResult>>,
}

impl AnalysisUpdate {
    pub fn decision(
        classifications: Vec<ClassificationCandidate>,
        actions: Vec<ActionCommand>,
    ) -> Self {
        Self {
            classifications: Some(classifications),
            actions: Some(actions),
            action_results: None,
        }
    }

    pub fn results(action_results: Vec<ActionResult>) -> Self {
        Self {
            action_results: Some(action_results),
            ..Default::default()
        }
    }
}

impl Analysis {
    pub fn is_empty(&self) -> bool {
        self.classifications.is_none() && self.actions.is_none() && self.action_results.is_none()
    }

    /// Shallow field-level merge: present fields overwrite, absent ones are kept.
    pub fn merge(&mut self, update: AnalysisUpdate) {
        if let Some(classifications) = update.classifications {
            self.classifications = Some(classifications);
        }
        if let Some(actions) = update.actions {
            self.actions = Some(actions);
        }
        if let Some(action_results) = update.action_results {
            self.action_results = Some(action_results);
        }
    }

    pub fn primary(&self) -> Option<&ClassificationCandidate> {
        self.classifications.as_ref().and_then(|c| c.first())
    }
}

/// One test execution's report plus everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub test_name: String,
    pub suite: String,
    pub build_id: String,
    pub environment: String,
    pub version: String,
    pub repository: String,
    pub platform: String,
    pub tags: Vec<String>,
    pub rerun_count: u32,
    pub logs: String,
    pub submitted_at: DateTime<Utc>,
    pub steps: Vec<String>,
    pub failed_step: FailedStep,
    pub analysis: Analysis,
}

impl Run {
    pub fn from_submission(id: RunId, submission: RunSubmission) -> Self {
        Self {
            id,
            test_name: submission.test_name,
            suite: submission.suite,
            build_id: submission.build_id,
            environment: submission.environment,
            version: submission.version,
            repository: submission.repository,
            platform: submission.platform,
            tags: submission.tags,
            rerun_count: submission.rerun_count,
            logs: submission.logs,
            submitted_at: Utc::now(),
            steps: Vec::new(),
            failed_step: FailedStep::NotFound,
            analysis: Analysis::default(),
        }
    }
}
