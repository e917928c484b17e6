pub mod steps;

pub use steps::{extract_steps, StepExtraction};
