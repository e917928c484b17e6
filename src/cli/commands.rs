use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Rule-driven triage of CI test-failure logs
#[derive(Parser, Debug)]
#[command(
    name = "triagebox",
    about = "Rule-driven triage of CI test-failure logs",
    version,
    author,
    long_about = "triagebox reads raw test logs, extracts the failed step, classifies the \
                  root cause with pattern, keyword and structural strategies, and records \
                  the remediation actions its rules imply. Actions are simulated."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Triage a single log file",
        long_about = "Runs one log file through the pipeline and prints the analysed run.\n\n\
                      Examples:\n  \
                      triagebox triage build.log\n  \
                      triagebox triage build.log --test-name test_mysql_backup --format json"
    )]
    Triage(TriageArgs),

    #[command(
        about = "Triage a batch of submissions from a JSON or YAML file",
        long_about = "Loads a list of submissions (or a mapping with a `runs` list) and runs \
                      each through the pipeline in order. Runs without an id are numbered \
                      run-0000, run-0001, ... in file order.\n\n\
                      Examples:\n  \
                      triagebox batch runs.json\n  \
                      triagebox batch runs.yaml --flow --format yaml"
    )]
    Batch(BatchArgs),

    #[command(about = "Triage the built-in showcase batch")]
    Demo(DemoArgs),

    #[command(
        about = "Show one run in detail",
        long_about = "Re-runs a batch (the demo batch unless --from is given) and prints the \
                      run with the given id.\n\n\
                      Examples:\n  \
                      triagebox show run-0003\n  \
                      triagebox show nightly-17 --from runs.json"
    )]
    Show(ShowArgs),

    #[command(about = "List classification categories and action kinds")]
    Catalog(FormatArgs),

    #[command(about = "Show the effective configuration")]
    Config(FormatArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct TriageArgs {
    #[arg(value_name = "LOG_FILE", help = "Raw log file to triage")]
    pub log_file: PathBuf,

    #[arg(long, value_name = "NAME", help = "Test name (defaults to the file stem)")]
    pub test_name: Option<String>,

    #[arg(long, value_name = "SUITE", help = "Test suite")]
    pub suite: Option<String>,

    #[arg(
        long,
        value_name = "COUNT",
        default_value = "0",
        help = "Times this test has already been rerun"
    )]
    pub rerun_count: u32,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    #[arg(value_name = "FILE", help = "JSON or YAML file of submissions")]
    pub file: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct DemoArgs {
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    #[arg(value_name = "RUN_ID", help = "Id of the run to show")]
    pub id: String,

    #[arg(long, value_name = "FILE", help = "Batch file to run instead of the demo batch")]
    pub from: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct FormatArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct OutputArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Include the triage flow log")]
    pub flow: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
