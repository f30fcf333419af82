//! One-shot logging setup with console fallback.
//!
//! `initialize` tries the file-backed configuration first. If a log file
//! cannot be opened (or its permissions cannot be tightened) every general
//! channel is rebound to the console and the trace channels are discarded.
//! The caller gets `Ok(())` either way.

use std::path::{Path, PathBuf};

use crate::channel::LogChannel;
use crate::config::{build_config, build_fallback_config, LoggingConfig};
use crate::error::{LogError, LogResult};
use crate::options::EffectiveOptions;
use crate::permissions::tighten_permissions;
use crate::registry::LoggerRegistry;

/// Configures `registry` from `options`, replacing whatever it held.
///
/// Errors only when the Windows default log directory cannot be created or
/// when even the console configuration cannot be applied.
pub fn initialize(registry: &LoggerRegistry, options: &EffectiveOptions) -> LogResult<()> {
    let config = build_config(options)?;
    let primary = config
        .handler_for(LogChannel::Root)
        .file_path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&options.filename));

    match configure_primary(registry, &config) {
        Ok(()) => {
            registry.logger(LogChannel::Root).debug(format!(
                "logging configured with {} log file(s)",
                config.file_paths().len()
            ));
            Ok(())
        }
        Err(LogError::PathUnavailable { .. }) => configure_fallback(registry, options, &primary),
        Err(err) => Err(err),
    }
}

/// Creates a registry writing to stderr, configures it and installs it as the
/// `log` facade's logger.
pub fn init_with(options: &EffectiveOptions) -> LogResult<LoggerRegistry> {
    let registry = LoggerRegistry::new();
    initialize(&registry, options)?;
    registry.install_global()?;
    Ok(registry)
}

fn configure_primary(registry: &LoggerRegistry, config: &LoggingConfig) -> LogResult<()> {
    for path in registry.apply(config)? {
        tighten_permissions(&path)
            .map_err(|source| LogError::PathUnavailable { path, source })?;
    }
    Ok(())
}

/// Always names the primary log file, whichever handler failed to open.
fn configure_fallback(
    registry: &LoggerRegistry,
    options: &EffectiveOptions,
    primary: &Path,
) -> LogResult<()> {
    if !options.quiet {
        registry.console().diagnostic(&format!(
            "Could not open {} for logging. Using stderr instead.",
            primary.display()
        ));
    }
    apply_fallback(registry, &build_fallback_config(options))
}

fn apply_fallback(registry: &LoggerRegistry, fallback: &LoggingConfig) -> LogResult<()> {
    registry
        .apply(fallback)
        .map_err(|err| LogError::FallbackApplication(Box::new(err)))?;
    Ok(())
}
