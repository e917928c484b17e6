//! In-memory run store shared by the pipeline stages

mod run_store;

pub use run_store::RunStore;
