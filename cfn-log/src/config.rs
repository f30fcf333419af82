//! Typed logging configuration.
//!
//! A `LoggingConfig` is plain data: a table of named handlers plus the
//! channel bindings that point at them. Building one does no file I/O, so the
//! primary and fallback configurations can be compared directly.

use log::LevelFilter;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::channel::LogChannel;
use crate::error::LogResult;
use crate::options::EffectiveOptions;
use crate::paths::{resolve_path, CMD_LOG_FILE, WIRE_LOG_FILE};

pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_BACKUP_COUNT: usize = 5;

static DISCARD: HandlerSpec = HandlerSpec::Discard;

/// Handler slots a configuration can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerName {
    Default,
    Wire,
    Cmd,
    Null,
    #[serde(rename = "tostderr")]
    ToStderr,
}

impl fmt::Display for HandlerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandlerName::Default => "default",
            HandlerName::Wire => "wire",
            HandlerName::Cmd => "cmd",
            HandlerName::Null => "null",
            HandlerName::ToStderr => "tostderr",
        };
        f.write_str(name)
    }
}

/// Record layout written by a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// `<timestamp> [<LEVEL>] <message>`
    Standard,
    /// `<timestamp> P<pid> [<LEVEL>] <message>`
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RotationPolicy {
    pub max_bytes: usize,
    pub backup_count: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerSpec {
    RotatingFile {
        path: PathBuf,
        rotation: RotationPolicy,
        level: LevelFilter,
        format: RecordFormat,
    },
    Discard,
    Console {
        level: LevelFilter,
        format: RecordFormat,
    },
}

impl HandlerSpec {
    fn rotating(path: PathBuf, level: LevelFilter, format: RecordFormat) -> Self {
        HandlerSpec::RotatingFile {
            path,
            rotation: RotationPolicy::default(),
            level,
            format,
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            HandlerSpec::RotatingFile { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Fully resolved channel-to-handler binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    handlers: BTreeMap<HandlerName, HandlerSpec>,
    bindings: BTreeMap<LogChannel, HandlerName>,
}

impl LoggingConfig {
    /// Starts a config where every channel is bound to the null handler.
    fn discarding() -> Self {
        let mut handlers = BTreeMap::new();
        handlers.insert(HandlerName::Null, HandlerSpec::Discard);
        let bindings = LogChannel::ALL
            .iter()
            .map(|channel| (*channel, HandlerName::Null))
            .collect();
        Self { handlers, bindings }
    }

    fn bind(&mut self, channels: &[LogChannel], name: HandlerName, spec: HandlerSpec) {
        self.handlers.insert(name, spec);
        for channel in channels {
            self.bindings.insert(*channel, name);
        }
    }

    pub fn handlers(&self) -> impl Iterator<Item = (HandlerName, &HandlerSpec)> {
        self.handlers.iter().map(|(name, spec)| (*name, spec))
    }

    pub fn handler_name(&self, channel: LogChannel) -> HandlerName {
        self.bindings
            .get(&channel)
            .copied()
            .unwrap_or(HandlerName::Null)
    }

    pub fn handler_for(&self, channel: LogChannel) -> &HandlerSpec {
        self.handlers
            .get(&self.handler_name(channel))
            .unwrap_or(&DISCARD)
    }

    /// Files the config would open, one entry per physical file.
    pub fn file_paths(&self) -> Vec<&Path> {
        self.handlers
            .values()
            .filter_map(HandlerSpec::file_path)
            .collect()
    }
}

const GENERAL_CHANNELS: [LogChannel; 4] = [
    LogChannel::Root,
    LogChannel::Init,
    LogChannel::Hup,
    LogChannel::Client,
];

/// Builds the primary, file-backed configuration.
///
/// Only resolves paths; on Windows that may create the default log directory.
pub fn build_config(options: &EffectiveOptions) -> LogResult<LoggingConfig> {
    let log_dir = options.log_dir.as_deref();
    let mut config = LoggingConfig::discarding();

    config.bind(
        &GENERAL_CHANNELS,
        HandlerName::Default,
        HandlerSpec::rotating(
            resolve_path(log_dir, &options.filename)?,
            options.level,
            RecordFormat::Standard,
        ),
    );

    if options.wire_log {
        config.bind(
            &[LogChannel::Wire],
            HandlerName::Wire,
            HandlerSpec::rotating(
                resolve_path(log_dir, WIRE_LOG_FILE)?,
                LevelFilter::Trace,
                RecordFormat::Standard,
            ),
        );
    }

    if options.cmd_log {
        config.bind(
            &[LogChannel::Cmd],
            HandlerName::Cmd,
            HandlerSpec::rotating(
                resolve_path(log_dir, CMD_LOG_FILE)?,
                LevelFilter::Trace,
                RecordFormat::Command,
            ),
        );
    }

    Ok(config)
}

/// Builds the console-only configuration used when the log files cannot be opened.
pub fn build_fallback_config(options: &EffectiveOptions) -> LoggingConfig {
    let mut config = LoggingConfig::discarding();
    config.bind(
        &GENERAL_CHANNELS,
        HandlerName::ToStderr,
        HandlerSpec::Console {
            level: options.level,
            format: RecordFormat::Standard,
        },
    );
    config
}
