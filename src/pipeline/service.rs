use super::orchestrator::TriagePipeline;
use crate::config::TriageConfig;
use crate::model::{ActionKind, Category, Run, RunId, RunSubmission};
use crate::store::RunStore;
use std::sync::Arc;
use tracing::info;

/// Management surface over a store and a pipeline.
///
/// Every operation is total: lookups of unknown ids return `None`, and
/// submissions always complete with a stored, fully analysed run.
pub struct TriageService {
    store: Arc<RunStore>,
    pipeline: TriagePipeline,
}

impl Default for TriageService {
    fn default() -> Self {
        Self::new(TriagePipeline::default())
    }
}

impl TriageService {
    pub fn new(pipeline: TriagePipeline) -> Self {
        Self::with_store(Arc::new(RunStore::new()), pipeline)
    }

    pub fn with_store(store: Arc<RunStore>, pipeline: TriagePipeline) -> Self {
        Self { store, pipeline }
    }

    pub fn from_config(config: &TriageConfig) -> Self {
        Self::new(TriagePipeline::from_config(config))
    }

    pub fn store(&self) -> &Arc<RunStore> {
        &self.store
    }

    pub fn submit(&self, submission: RunSubmission) -> RunId {
        self.pipeline.process(&self.store, submission)
    }

    /// Clears the store, then submits each run in order.
    pub fn submit_batch(&self, submissions: Vec<RunSubmission>) -> Vec<RunId> {
        self.pipeline.process_batch(&self.store, submissions)
    }

    pub fn get_by_id(&self, id: &RunId) -> Option<Run> {
        self.store.get(id)
    }

    pub fn list_all(&self) -> Vec<Run> {
        self.store.list()
    }

    pub fn reset(&self) {
        info!(runs = self.store.len(), "Resetting run store");
        self.store.clear();
    }

    /// Display names of the closed category set, sorted.
    pub fn list_categories() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Category::all_variants()
            .iter()
            .map(Category::name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Display names of the closed action-kind set, sorted.
    pub fn list_action_kinds() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = ActionKind::all_variants()
            .iter()
            .map(ActionKind::name)
            .collect();
        names.sort_unstable();
        names
    }
}
