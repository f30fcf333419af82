//! Logging setup for the cfn host agent tools.
//!
//! Six fixed channels (`root`, `cfn.init`, `cfn.client`, `cfn.hup`, `wire`,
//! `cfn.init.cmd`) are bound to rotating log files, a discarding sink, or the
//! console. Tools call [`initialize`] once at startup and then log through
//! the [`LoggerRegistry`] or the `log` macros with a channel target.
//!
//! ```no_run
//! use cfn_log::{initialize, EffectiveOptions, LogChannel, LoggerRegistry};
//!
//! let registry = LoggerRegistry::new();
//! initialize(&registry, &EffectiveOptions::new().log_dir("/tmp/testlogs")).unwrap();
//! registry.logger(LogChannel::Init).info("cfn-init started");
//! ```

pub mod channel;
pub mod cli;
pub mod config;
pub mod error;
pub mod initializer;
pub mod options;
pub mod paths;
pub mod permissions;
pub mod registry;
pub mod sink;

pub use channel::LogChannel;
pub use config::{
    build_config, build_fallback_config, HandlerName, HandlerSpec, LoggingConfig, RecordFormat,
    RotationPolicy,
};
pub use error::{LogError, LogResult};
pub use initializer::{init_with, initialize};
pub use options::{parse_level, EffectiveOptions};
pub use paths::resolve_path;
pub use registry::{ChannelLogger, LoggerRegistry};
pub use sink::{ConsoleBuffer, ConsoleTarget, SharedWriter};
