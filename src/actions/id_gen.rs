//! Opaque identifier generation

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of run ids and the short hex tokens embedded in action results.
pub trait IdGenerator: Send + Sync {
    fn run_id(&self) -> String;

    /// `len` lowercase hex characters.
    fn hex(&self, len: usize) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn run_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn hex(&self, len: usize) -> String {
        let mut out = String::with_capacity(len);
        while out.len() < len {
            let simple = Uuid::new_v4().simple().to_string();
            let take = (len - out.len()).min(simple.len());
            out.push_str(&simple[..take]);
        }
        out
    }
}

/// Deterministic counter-based ids, for tests and reproducible demos.
///
/// Run ids and hex tokens count independently, so a batch is numbered
/// `run-0000`, `run-0001`, ... regardless of how many tokens its actions use.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next_run: AtomicU64,
    next_token: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(start: u64) -> Self {
        Self {
            next_run: AtomicU64::new(start),
            next_token: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn run_id(&self) -> String {
        format!("run-{:04}", self.next_run.fetch_add(1, Ordering::Relaxed))
    }

    fn hex(&self, len: usize) -> String {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let value = format!("{:0width$x}", token, width = len);
        value[value.len() - len..].to_string()
    }
}
