//! Configuration management for triagebox
//!
//! Settings are loaded from environment variables with defaults.
//!
//! # Environment Variables
//!
//! - `TRIAGEBOX_LOG_LEVEL`: Logging level - default: "info"
//! - `TRIAGEBOX_LOG_JSON`: JSON log output (true|false) - default: "false"
//! - `TRIAGEBOX_MAX_RERUNS`: Reruns an infrastructure error may request, 0 for none - default: "0"
//! - `TRIAGEBOX_DEDUP_POLICY`: Action dedup policy (last|first) - default: "last"
//! - `TRIAGEBOX_AUDIT_FILE`: Path of the JSON-lines stage audit log - default: unset
//! - `TRIAGEBOX_MAX_LOG_BYTES`: Logs above this size are truncated - default: "1048576"
//!
//! # Example
//!
//! ```no_run
//! use triagebox::TriageConfig;
//!
//! let config = TriageConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::pipeline::orchestrator::DEFAULT_MAX_LOG_BYTES;
use crate::rules::{DedupPolicy, RuleSettings};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_LOG_LEVEL: &str = "TRIAGEBOX_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "TRIAGEBOX_LOG_JSON";
pub const ENV_MAX_RERUNS: &str = "TRIAGEBOX_MAX_RERUNS";
pub const ENV_DEDUP_POLICY: &str = "TRIAGEBOX_DEDUP_POLICY";
pub const ENV_AUDIT_FILE: &str = "TRIAGEBOX_AUDIT_FILE";
pub const ENV_MAX_LOG_BYTES: &str = "TRIAGEBOX_MAX_LOG_BYTES";

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_RERUNS: u32 = 0;

const MIN_LOG_BYTES: usize = 1024;
const MAX_LOG_BYTES: usize = 67_108_864; // 64MiB
const MAX_RERUN_BUDGET: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriageConfig {
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_json: bool,

    /// Reruns an infrastructure error may request; zero disables the request
    pub max_reruns: u32,

    pub dedup_policy: DedupPolicy,

    pub audit_file: Option<PathBuf>,

    /// Larger logs are truncated before the pipeline sees them
    pub max_log_bytes: usize,
}

impl Default for TriageConfig {
    /// Loads from environment variables; unparseable values fall back to defaults.
    fn default() -> Self {
        Self::load(false).unwrap_or_else(|_| Self::builtin())
    }
}

impl TriageConfig {
    /// Built-in defaults, ignoring the environment.
    pub fn builtin() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            max_reruns: DEFAULT_MAX_RERUNS,
            dedup_policy: DedupPolicy::default(),
            audit_file: None,
            max_log_bytes: DEFAULT_MAX_LOG_BYTES,
        }
    }

    /// Loads from environment variables, rejecting values that do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(true)
    }

    fn load(strict: bool) -> Result<Self, ConfigError> {
        let defaults = Self::builtin();

        let log_level = env::var(ENV_LOG_LEVEL)
            .unwrap_or(defaults.log_level)
            .to_lowercase();

        let audit_file = env::var(ENV_AUDIT_FILE)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            log_level,
            log_json: read_var(ENV_LOG_JSON, defaults.log_json, strict)?,
            max_reruns: read_var(ENV_MAX_RERUNS, defaults.max_reruns, strict)?,
            dedup_policy: read_var(ENV_DEDUP_POLICY, defaults.dedup_policy, strict)?,
            audit_file,
            max_log_bytes: read_var(ENV_MAX_LOG_BYTES, defaults.max_log_bytes, strict)?,
        })
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the log level is unknown or a limit is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_log_bytes < MIN_LOG_BYTES {
            return Err(ConfigError::ValidationFailed(
                "Max log size must be at least 1KiB".to_string(),
            ));
        }
        if self.max_log_bytes > MAX_LOG_BYTES {
            return Err(ConfigError::ValidationFailed(
                "Max log size cannot exceed 64MiB".to_string(),
            ));
        }

        if self.max_reruns > MAX_RERUN_BUDGET {
            return Err(ConfigError::ValidationFailed(format!(
                "Rerun budget cannot exceed {}",
                MAX_RERUN_BUDGET
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn rule_settings(&self) -> RuleSettings {
        RuleSettings {
            max_reruns: self.max_reruns,
        }
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("log_json".to_string(), self.log_json.to_string());
        map.insert("max_reruns".to_string(), self.max_reruns.to_string());
        map.insert("dedup_policy".to_string(), self.dedup_policy.to_string());
        if let Some(ref path) = self.audit_file {
            map.insert("audit_file".to_string(), path.display().to_string());
        }
        map.insert("max_log_bytes".to_string(), self.max_log_bytes.to_string());

        map
    }
}

fn read_var<T>(key: &str, default: T, strict: bool) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };

    match raw.trim().parse::<T>() {
        Ok(value) => Ok(value),
        Err(e) if strict => Err(ConfigError::ParseError {
            field: key.to_string(),
            error: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

impl fmt::Display for TriageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Triagebox Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  JSON Logs: {}", self.log_json)?;
        writeln!(f, "  Rerun Budget: {}", self.max_reruns)?;
        writeln!(f, "  Dedup Policy: {}", self.dedup_policy)?;
        if let Some(ref path) = self.audit_file {
            writeln!(f, "  Audit File: {}", path.display())?;
        }
        writeln!(f, "  Max Log Size: {} bytes", self.max_log_bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clear_all() -> Vec<EnvGuard> {
        [
            ENV_LOG_LEVEL,
            ENV_LOG_JSON,
            ENV_MAX_RERUNS,
            ENV_DEDUP_POLICY,
            ENV_AUDIT_FILE,
            ENV_MAX_LOG_BYTES,
        ]
        .iter()
        .map(|key| EnvGuard::unset(key))
        .collect()
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clear_all();

        let config = TriageConfig::default();

        assert_eq!(config, TriageConfig::builtin());
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.max_reruns, DEFAULT_MAX_RERUNS);
        assert_eq!(config.dedup_policy, DedupPolicy::Last);
        assert_eq!(config.audit_file, None);
        assert_eq!(config.max_log_bytes, DEFAULT_MAX_LOG_BYTES);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _cleared = clear_all();
        let _guards = vec![
            EnvGuard::set(ENV_LOG_LEVEL, "DEBUG"),
            EnvGuard::set(ENV_LOG_JSON, "true"),
            EnvGuard::set(ENV_MAX_RERUNS, "3"),
            EnvGuard::set(ENV_DEDUP_POLICY, "first"),
            EnvGuard::set(ENV_AUDIT_FILE, "/tmp/triage-audit.jsonl"),
            EnvGuard::set(ENV_MAX_LOG_BYTES, "4096"),
        ];

        let config = TriageConfig::from_env().unwrap();

        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert_eq!(config.max_reruns, 3);
        assert_eq!(config.dedup_policy, DedupPolicy::First);
        assert_eq!(
            config.audit_file,
            Some(PathBuf::from("/tmp/triage-audit.jsonl"))
        );
        assert_eq!(config.max_log_bytes, 4096);
        assert_eq!(config.rule_settings().max_reruns, 3);
    }

    #[test]
    #[serial]
    fn test_unparseable_value_strict_vs_lenient() {
        let _cleared = clear_all();
        let _guard = EnvGuard::set(ENV_MAX_RERUNS, "lots");

        assert!(matches!(
            TriageConfig::from_env(),
            Err(ConfigError::ParseError { ref field, .. }) if field == ENV_MAX_RERUNS
        ));
        assert_eq!(TriageConfig::default().max_reruns, DEFAULT_MAX_RERUNS);
    }

    #[test]
    #[serial]
    fn test_blank_audit_file_is_unset() {
        let _cleared = clear_all();
        let _guard = EnvGuard::set(ENV_AUDIT_FILE, "  ");
        assert_eq!(TriageConfig::default().audit_file, None);
    }

    #[test]
    fn test_configuration_validation_invalid_log_level() {
        let mut config = TriageConfig::builtin();
        config.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_ranges() {
        let mut config = TriageConfig::builtin();
        config.max_log_bytes = 10;
        assert!(config.validate().is_err());

        let mut config = TriageConfig::builtin();
        config.max_reruns = 99;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_display() {
        let mut config = TriageConfig::builtin();
        config.audit_file = Some(PathBuf::from("/tmp/a.jsonl"));
        let display = format!("{}", config);
        assert!(display.contains("Triagebox Configuration:"));
        assert!(display.contains("Dedup Policy: last"));
        assert!(display.contains("Audit File: /tmp/a.jsonl"));

        let map = config.to_display_map();
        assert_eq!(map.get("max_reruns").map(String::as_str), Some("0"));
        assert_eq!(map.get("audit_file").map(String::as_str), Some("/tmp/a.jsonl"));
    }
}
