//! Structured logging setup for triagebox
//!
//! Everything goes to stderr so report output on stdout stays parseable.
//! `RUST_LOG`, when set, replaces the level-based filter entirely. The
//! subscriber can only be installed once per process; later calls are ignored.
//!
//! # Example
//!
//! ```no_run
//! use triagebox::util::logging;
//!
//! logging::init_from_env();
//! tracing::info!("Triage started");
//! ```

use crate::config::TriageConfig;
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,

    /// Include the module target (e.g., triagebox::rules::engine)
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Plain,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn from_triage_config(config: &TriageConfig) -> Self {
        Self {
            level: parse_level(&config.log_level),
            format: if config.log_json {
                LogFormat::Json
            } else {
                LogFormat::Plain
            },
            ..Default::default()
        }
    }

    /// Command-line precedence: an explicit level, then `-v`, then `-q`, then
    /// the configured level.
    pub fn for_cli(
        config: &TriageConfig,
        log_level: Option<&str>,
        verbose: bool,
        quiet: bool,
    ) -> Self {
        let mut logging = Self::from_triage_config(config);
        logging.level = match log_level {
            Some(level) => parse_level(level),
            None if verbose => Level::DEBUG,
            None if quiet => Level::ERROR,
            None => logging.level,
        };
        logging
    }
}

/// Parses a log level name, case-insensitively
///
/// Unknown names fall back to `Level::INFO` with a note on stderr.
///
/// # Example
///
/// ```
/// use triagebox::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    level_str.trim().parse::<Level>().unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var_os("RUST_LOG").is_some() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
}

fn build_layer(config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.include_target)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Plain => layer.boxed(),
    }
}

/// Installs the global subscriber. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(build_layer(&config))
            .with(build_filter(config.level))
            .init();
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `TRIAGEBOX_LOG_LEVEL` and `TRIAGEBOX_LOG_JSON`.
pub fn init_from_env() {
    init_logging(LoggingConfig::from_triage_config(&TriageConfig::default()));
}
