use std::path::PathBuf;
use std::sync::Arc;

use triagebox::{SequentialIdGenerator, TriagePipeline, TriageService};

#[allow(dead_code)]
pub fn get_triagebox_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.join("triagebox")
}

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A service numbering runs `run-0000`, `run-0001`, ... with deterministic tokens.
#[allow(dead_code)]
pub fn sequential_service() -> TriageService {
    TriageService::new(
        TriagePipeline::new().with_id_generator(Arc::new(SequentialIdGenerator::new())),
    )
}
