//! JSON-lines audit trail of pipeline stage inputs and outputs

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

#[derive(Serialize)]
struct StageEntry<'a, I, O>
where
    I: Serialize,
    O: Serialize,
{
    stage: &'a str,
    run_id: &'a str,
    #[serde(serialize_with = "serialize_as_json")]
    input: &'a I,
    #[serde(serialize_with = "serialize_as_json")]
    output: &'a O,
    latency_ms: u64,
    timestamp: DateTime<Utc>,
}

fn serialize_as_json<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let json_string = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&json_string)
}

/// Appends one line per stage. A file that cannot be opened leaves the logger
/// disabled after one warning; write failures are warned about per entry and
/// the logger keeps trying.
#[derive(Clone, Default)]
pub struct AuditLogger {
    writer: Option<Arc<Mutex<BufWriter<File>>>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("path", &self.path)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AuditLogger {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        let Some(path) = log_file else {
            return Self::disabled();
        };

        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Self {
                writer: Some(Arc::new(Mutex::new(BufWriter::new(file)))),
                path: Some(path),
            },
            Err(e) => {
                warn!("Failed to open audit log file {:?}: {}", path, e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn log_stage<I, O>(&self, stage: &str, run_id: &str, input: &I, output: &O, latency_ms: u64)
    where
        I: Serialize,
        O: Serialize,
    {
        let Some(writer) = &self.writer else {
            return;
        };

        let entry = StageEntry {
            stage,
            run_id,
            input,
            output,
            latency_ms,
            timestamp: Utc::now(),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize audit entry for stage {}: {}", stage, e);
                return;
            }
        };

        let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", json) {
            warn!("Failed to write audit log entry: {}", e);
        }
        if let Err(e) = writer.flush() {
            warn!("Failed to flush audit log: {}", e);
        }

        debug!(stage, run_id, latency_ms, "Audit entry written");
    }
}
