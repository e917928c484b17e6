pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BatchArgs, CliArgs, Commands, DemoArgs, ShowArgs, TriageArgs};
pub use output::{Catalog, OutputFormat, OutputFormatter};
