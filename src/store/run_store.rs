use crate::model::{AnalysisUpdate, FailedStep, Run, RunId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    runs: HashMap<RunId, Run>,
    order: Vec<RunId>,
}

/// Keyed collection of runs, id to [`Run`].
///
/// Constructed explicitly and passed by reference to each stage. Interior
/// locking serializes every read-merge-write, so a store can be shared between
/// producers. Records are listed in first-insertion order.
#[derive(Debug, Default)]
pub struct RunStore {
    inner: RwLock<Inner>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or replaces a run. A replaced run keeps its listing position.
    pub fn upsert(&self, run: Run) {
        let mut inner = self.write();
        let id = run.id.clone();
        if inner.runs.insert(id.clone(), run).is_none() {
            inner.order.push(id);
        }
    }

    /// Returns a snapshot of the run, or `None` when the id was never stored.
    pub fn get(&self, id: &RunId) -> Option<Run> {
        self.read().runs.get(id).cloned()
    }

    pub fn contains(&self, id: &RunId) -> bool {
        self.read().runs.contains_key(id)
    }

    /// Shallow-merges `update` into the run's analysis under the write lock.
    ///
    /// Returns `false` when the id is unknown; nothing is created in that case.
    pub fn merge_analysis(&self, id: &RunId, update: AnalysisUpdate) -> bool {
        let mut inner = self.write();
        match inner.runs.get_mut(id) {
            Some(run) => {
                run.analysis.merge(update);
                true
            }
            None => {
                debug!(run_id = %id, "Analysis update for unknown run ignored");
                false
            }
        }
    }

    /// Writes the step extractor's fields. Returns `false` for an unknown id.
    pub fn record_steps(&self, id: &RunId, steps: Vec<String>, failed_step: FailedStep) -> bool {
        let mut inner = self.write();
        match inner.runs.get_mut(id) {
            Some(run) => {
                run.steps = steps;
                run.failed_step = failed_step;
                true
            }
            None => false,
        }
    }

    pub fn list(&self) -> Vec<Run> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.runs.get(id).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        inner.runs.clear();
        inner.order.clear();
    }
}
