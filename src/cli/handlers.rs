//! Subcommand handlers. Each returns the process exit code.

use crate::actions::SequentialIdGenerator;
use crate::cli::commands::{
    BatchArgs, DemoArgs, FormatArgs, OutputArgs, ShowArgs, TriageArgs,
};
use crate::cli::output::{Catalog, OutputFormat, OutputFormatter};
use crate::config::TriageConfig;
use crate::ingest::{demo_submissions, load_submissions, submission_from_log};
use crate::model::{Run, RunId, RunSubmission};
use crate::pipeline::{TriagePipeline, TriageService};
use crate::progress::{FanOutHandler, LoggingHandler, ProgressHandler, RecordingHandler};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

pub fn handle_triage(args: &TriageArgs, quiet: bool) -> i32 {
    exit_code(run_triage(args, quiet))
}

pub fn handle_batch(args: &BatchArgs, quiet: bool) -> i32 {
    exit_code(run_batch(args, quiet))
}

pub fn handle_demo(args: &DemoArgs, quiet: bool) -> i32 {
    exit_code(run_batch_submissions(demo_submissions(), &args.output, quiet))
}

pub fn handle_show(args: &ShowArgs) -> i32 {
    exit_code(run_show(args))
}

pub fn handle_catalog(args: &FormatArgs) -> i32 {
    let catalog = Catalog {
        categories: TriageService::list_categories(),
        action_kinds: TriageService::list_action_kinds(),
    };
    exit_code(
        OutputFormatter::new(args.format.into())
            .format_catalog(&catalog)
            .map(|output| println!("{}", output)),
    )
}

pub fn handle_config(args: &FormatArgs) -> i32 {
    exit_code(load_config().and_then(|config| {
        let output = OutputFormatter::new(args.format.into()).format_config(&config)?;
        println!("{}", output);
        Ok(())
    }))
}

fn run_triage(args: &TriageArgs, quiet: bool) -> Result<()> {
    let config = load_config()?;
    let submission = submission_from_log(&args.log_file, args.test_name.as_deref())?
        .with_suite(args.suite.clone().unwrap_or_default())
        .with_rerun_count(args.rerun_count);

    info!(path = %args.log_file.display(), "Triaging log file");

    let session = Session::new(&config, args.output.flow, false);
    let id = session.service.submit(submission);
    let run = session
        .service
        .get_by_id(&id)
        .with_context(|| format!("Run {} missing from store after triage", id))?;

    session.emit(std::slice::from_ref(&run), &args.output, quiet)
}

fn run_batch(args: &BatchArgs, quiet: bool) -> Result<()> {
    let submissions = load_submissions(&args.file)
        .with_context(|| format!("Failed to load batch from {}", args.file.display()))?;
    run_batch_submissions(submissions, &args.output, quiet)
}

fn run_batch_submissions(
    submissions: Vec<RunSubmission>,
    output: &OutputArgs,
    quiet: bool,
) -> Result<()> {
    let config = load_config()?;
    let session = Session::new(&config, output.flow, true);
    session.service.submit_batch(submissions);
    session.emit(&session.service.list_all(), output, quiet)
}

fn run_show(args: &ShowArgs) -> Result<()> {
    let config = load_config()?;
    let submissions = match &args.from {
        Some(path) => load_submissions(path)
            .with_context(|| format!("Failed to load batch from {}", path.display()))?,
        None => demo_submissions(),
    };

    let session = Session::new(&config, false, true);
    session.service.submit_batch(submissions);

    let id = RunId::from(args.id.as_str());
    let run = session
        .service
        .get_by_id(&id)
        .with_context(|| format!("No run with id '{}'", id))?;

    let output = OutputFormatter::new(args.format.into()).format_run(&run)?;
    println!("{}", output);
    Ok(())
}

/// A service wired for one CLI invocation, with an optional flow recorder.
struct Session {
    service: TriageService,
    recorder: Option<Arc<RecordingHandler>>,
}

impl Session {
    fn new(config: &TriageConfig, flow: bool, sequential_ids: bool) -> Self {
        let recorder = flow.then(|| Arc::new(RecordingHandler::new()));
        let progress: Arc<dyn ProgressHandler> = match &recorder {
            Some(recorder) => Arc::new(FanOutHandler::new(vec![
                Arc::clone(recorder) as Arc<dyn ProgressHandler>,
                Arc::new(LoggingHandler),
            ])),
            None => Arc::new(LoggingHandler),
        };

        let mut pipeline = TriagePipeline::from_config(config).with_progress(progress);
        if sequential_ids {
            pipeline = pipeline.with_id_generator(Arc::new(SequentialIdGenerator::new()));
        }

        Self {
            service: TriageService::new(pipeline),
            recorder,
        }
    }

    fn emit(&self, runs: &[Run], output: &OutputArgs, quiet: bool) -> Result<()> {
        let flow_log = self.recorder.as_ref().map(|r| r.lines());
        let format: OutputFormat = output.format.into();
        let rendered = OutputFormatter::new(format).format_runs(runs, flow_log.as_deref())?;
        write_output(&rendered, output.output.as_deref(), quiet)
    }
}

fn load_config() -> Result<TriageConfig> {
    let config = TriageConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

fn write_output(rendered: &str, path: Option<&Path>, quiet: bool) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                eprintln!("Output written to {}", path.display());
            }
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
