use triagebox::cli::commands::{CliArgs, Commands};
use triagebox::cli::handlers::{
    handle_batch, handle_catalog, handle_config, handle_demo, handle_show, handle_triage,
};
use triagebox::util::logging::{init_logging, LoggingConfig};
use triagebox::{TriageConfig, VERSION};

use clap::Parser;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("triagebox v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Triage(triage_args) => handle_triage(triage_args, args.quiet),
        Commands::Batch(batch_args) => handle_batch(batch_args, args.quiet),
        Commands::Demo(demo_args) => handle_demo(demo_args, args.quiet),
        Commands::Show(show_args) => handle_show(show_args),
        Commands::Catalog(format_args) => handle_catalog(format_args),
        Commands::Config(format_args) => handle_config(format_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let config = TriageConfig::default();
    init_logging(LoggingConfig::for_cli(
        &config,
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));
}
