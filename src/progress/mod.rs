//! Progress reporting for triage runs

mod handler;
mod logging;
mod recording;

pub use handler::{NoOpHandler, ProgressHandler, TriageEvent};
pub use logging::LoggingHandler;
pub use recording::{FanOutHandler, RecordingHandler};
