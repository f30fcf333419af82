//! Caller-supplied logging options.

use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{LogError, LogResult};

pub const DEFAULT_LOG_FILE: &str = "cfn-init.log";

/// Options for one configuration attempt.
///
/// Defaults: level `INFO`, not quiet, `cfn-init.log` in the platform log
/// directory, wire and command trace files enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOptions {
    pub level: LevelFilter,
    pub quiet: bool,
    pub filename: String,
    pub log_dir: Option<PathBuf>,
    pub wire_log: bool,
    pub cmd_log: bool,
}

impl Default for EffectiveOptions {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            quiet: false,
            filename: DEFAULT_LOG_FILE.to_string(),
            log_dir: None,
            wire_log: true,
            cmd_log: true,
        }
    }
}

impl EffectiveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn wire_log(mut self, enabled: bool) -> Self {
        self.wire_log = enabled;
        self
    }

    pub fn cmd_log(mut self, enabled: bool) -> Self {
        self.cmd_log = enabled;
        self
    }

    /// Parses options from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> LogResult<Self> {
        let file: OptionsFile =
            toml::from_str(content).map_err(|e| LogError::Config(e.to_string()))?;
        file.into_options()
    }

    pub fn from_toml_file(path: &Path) -> LogResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LogError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}

/// On-disk shape of the options file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OptionsFile {
    level: Option<String>,
    quiet: Option<bool>,
    filename: Option<String>,
    log_dir: Option<PathBuf>,
    wire_log: Option<bool>,
    cmd_log: Option<bool>,
}

impl OptionsFile {
    fn into_options(self) -> LogResult<EffectiveOptions> {
        let defaults = EffectiveOptions::default();
        Ok(EffectiveOptions {
            level: match self.level {
                Some(name) => parse_level(&name)?,
                None => defaults.level,
            },
            quiet: self.quiet.unwrap_or(defaults.quiet),
            filename: self.filename.unwrap_or(defaults.filename),
            log_dir: self.log_dir,
            wire_log: self.wire_log.unwrap_or(defaults.wire_log),
            cmd_log: self.cmd_log.unwrap_or(defaults.cmd_log),
        })
    }
}

/// Parses a level name, case-insensitively.
///
/// Accepts the `log` crate names plus `WARNING`, `CRITICAL`/`FATAL` (error)
/// and `NOTSET` (everything).
pub fn parse_level(name: &str) -> LogResult<LevelFilter> {
    let level = match name.trim().to_ascii_uppercase().as_str() {
        "NOTSET" | "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" | "CRITICAL" | "FATAL" => LevelFilter::Error,
        "OFF" => LevelFilter::Off,
        _ => return Err(LogError::InvalidLevel(name.to_string())),
    };
    Ok(level)
}
