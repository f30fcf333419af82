//! CLI argument parsing for `cfn-log`
//!
//! Configures logging the same way cfn-init and cfn-hup do at startup, then
//! optionally writes one record. Handy for checking a host's log layout.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use crate::config::build_config;
use crate::initializer::init_with;
use crate::options::{parse_level, EffectiveOptions};

#[derive(Parser, Debug)]
#[command(name = "cfn-log")]
#[command(about = "Set up cfn agent logging and optionally emit a record")]
pub struct Cli {
    /// TOML file with logging options (level, quiet, filename, log_dir, wire_log, cmd_log)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum level for the main log (TRACE, DEBUG, INFO, WARNING, ERROR)
    #[arg(long)]
    pub level: Option<String>,

    /// Shortcut for --level DEBUG
    #[arg(short, long, conflicts_with = "level")]
    pub verbose: bool,

    /// Do not report a console fallback on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Main log file name
    #[arg(long)]
    pub filename: Option<String>,

    /// Directory for log files instead of the platform default
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Do not write cfn-wire.log
    #[arg(long)]
    pub no_wire_log: bool,

    /// Do not write cfn-init-cmd.log
    #[arg(long)]
    pub no_cmd_log: bool,

    /// Print the resolved logging configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Channel for --message (root, init, client, hup, wire, cmd or a qualified name)
    #[arg(long, default_value = "root")]
    pub channel: String,

    /// Message to log at INFO after configuring
    #[arg(long)]
    pub message: Option<String>,
}

impl Cli {
    /// Options file first, then explicit flags on top.
    pub fn options(&self) -> anyhow::Result<EffectiveOptions> {
        let mut options = match &self.config {
            Some(path) => EffectiveOptions::from_toml_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => EffectiveOptions::default(),
        };

        if self.verbose {
            options.level = log::LevelFilter::Debug;
        } else if let Some(level) = &self.level {
            options.level = parse_level(level)?;
        }
        if self.quiet {
            options.quiet = true;
        }
        if let Some(filename) = &self.filename {
            options.filename = filename.clone();
        }
        if let Some(dir) = &self.log_dir {
            options.log_dir = Some(dir.clone());
        }
        if self.no_wire_log {
            options.wire_log = false;
        }
        if self.no_cmd_log {
            options.cmd_log = false;
        }
        Ok(options)
    }
}

pub fn run() -> anyhow::Result<()> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> anyhow::Result<()> {
    let options = cli.options()?;

    if cli.dump_config {
        let config = build_config(&options)?;
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let registry = init_with(&options).context("failed to configure logging")?;

    if let Some(message) = &cli.message {
        let logger = registry.logger_named(&cli.channel)?;
        logger.info(message);
        logger.flush();
    }
    Ok(())
}
