//! The logger registry: the live channel-to-handler table.
//!
//! A `LoggerRegistry` is created once at startup and handed to whatever needs
//! to log. Cloning it is cheap and every clone sees the same table.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::channel::LogChannel;
use crate::config::{HandlerName, LoggingConfig};
use crate::error::{LogError, LogResult};
use crate::sink::{ConsoleTarget, Handler};

#[derive(Clone, Default)]
pub struct LoggerRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    console: ConsoleTarget,
    bindings: RwLock<HashMap<LogChannel, Arc<Handler>>>,
}

impl LoggerRegistry {
    /// An unconfigured registry writing console output to stderr.
    ///
    /// Records sent before the first `apply` are dropped.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_console(console: ConsoleTarget) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                console,
                bindings: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn console(&self) -> &ConsoleTarget {
        &self.inner.console
    }

    /// Opens every handler in `config` and swaps them in as the live table.
    ///
    /// Handlers are shared between channels bound to the same name, so a file
    /// is opened once no matter how many channels write to it. If any handler
    /// fails to open, the previous table stays in place. Returns the files
    /// that were opened.
    pub fn apply(&self, config: &LoggingConfig) -> LogResult<Vec<PathBuf>> {
        let mut opened: HashMap<HandlerName, Arc<Handler>> = HashMap::new();
        let mut files = Vec::new();
        for (name, spec) in config.handlers() {
            let handler = Handler::open(spec, &self.inner.console)?;
            if let Some(path) = spec.file_path() {
                files.push(path.to_path_buf());
            }
            opened.insert(name, Arc::new(handler));
        }

        let bindings = LogChannel::ALL
            .iter()
            .map(|channel| {
                let handler = opened
                    .get(&config.handler_name(*channel))
                    .cloned()
                    .unwrap_or_else(|| Arc::new(Handler::Discard));
                (*channel, handler)
            })
            .collect::<HashMap<_, _>>();

        let previous = {
            let mut table = self
                .inner
                .bindings
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *table, bindings)
        };
        for handler in previous.values() {
            handler.flush();
        }
        Ok(files)
    }

    pub fn logger(&self, channel: LogChannel) -> ChannelLogger {
        ChannelLogger {
            registry: self.clone(),
            channel,
        }
    }

    /// Looks a channel up by short or qualified name (`init`, `cfn.init`).
    pub fn logger_named(&self, name: &str) -> LogResult<ChannelLogger> {
        Ok(self.logger(name.parse()?))
    }

    /// Routes the `log` facade macros through this registry.
    ///
    /// The facade accepts one logger per process; a second call fails.
    pub fn install_global(&self) -> LogResult<()> {
        log::set_boxed_logger(Box::new(self.clone())).map_err(|_| LogError::GlobalLoggerSet)?;
        log::set_max_level(LevelFilter::Trace);
        Ok(())
    }

    fn handler(&self, channel: LogChannel) -> Option<Arc<Handler>> {
        self.inner
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&channel)
            .cloned()
    }

    fn dispatch(&self, channel: LogChannel, record: &Record<'_>) {
        if let Some(handler) = self.handler(channel) {
            handler.log(record);
        }
    }
}

impl fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("console", &self.inner.console)
            .finish_non_exhaustive()
    }
}

impl Log for LoggerRegistry {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.handler(LogChannel::for_target(metadata.target()))
            .map_or(false, |handler| handler.enabled(metadata))
    }

    fn log(&self, record: &Record<'_>) {
        self.dispatch(LogChannel::for_target(record.target()), record);
    }

    fn flush(&self) {
        let table = self
            .inner
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for handler in table.values() {
            handler.flush();
        }
    }
}

/// A handle for logging on one channel.
#[derive(Clone, Debug)]
pub struct ChannelLogger {
    registry: LoggerRegistry,
    channel: LogChannel,
}

impl ChannelLogger {
    pub fn channel(&self) -> LogChannel {
        self.channel
    }

    pub fn enabled(&self, level: Level) -> bool {
        let metadata = Metadata::builder()
            .level(level)
            .target(self.channel.qualified_name())
            .build();
        self.registry
            .handler(self.channel)
            .map_or(false, |handler| handler.enabled(&metadata))
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        self.registry.dispatch(
            self.channel,
            &Record::builder()
                .level(level)
                .target(self.channel.qualified_name())
                .args(args)
                .build(),
        );
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, format_args!("{}", message));
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Level::Warn, format_args!("{}", message));
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, format_args!("{}", message));
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, format_args!("{}", message));
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.log(Level::Trace, format_args!("{}", message));
    }

    pub fn flush(&self) {
        if let Some(handler) = self.registry.handler(self.channel) {
            handler.flush();
        }
    }
}
