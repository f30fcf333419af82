//! Physical handlers built from a `HandlerSpec`.
//!
//! Every writing handler is an `env_logger::Logger` with a fixed level filter
//! and one of the two record layouts; only the target differs.

use env_logger::fmt::Formatter;
use env_logger::{Target, WriteStyle};
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use log::{LevelFilter, Log, Metadata, Record};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{HandlerSpec, RecordFormat, RotationPolicy};
use crate::error::{LogError, LogResult};

/// Where console handlers and the fallback diagnostic write.
#[derive(Clone, Default)]
pub enum ConsoleTarget {
    #[default]
    Stderr,
    Writer(SharedWriter),
}

impl ConsoleTarget {
    /// Console output goes to `writer` instead of the process stderr.
    pub fn writer<W: Write + Send + 'static>(writer: W) -> Self {
        ConsoleTarget::Writer(SharedWriter::new(writer))
    }

    /// Console output is kept in memory; read it back through the returned
    /// buffer.
    pub fn buffer() -> (Self, ConsoleBuffer) {
        let buffer = ConsoleBuffer::default();
        (ConsoleTarget::writer(buffer.clone()), buffer)
    }

    fn env_target(&self) -> Target {
        match self {
            ConsoleTarget::Stderr => Target::Stderr,
            ConsoleTarget::Writer(writer) => Target::Pipe(Box::new(writer.clone())),
        }
    }

    /// Writes one line outside of any handler. Failures are ignored.
    pub fn diagnostic(&self, line: &str) {
        match self {
            ConsoleTarget::Stderr => {
                let _ = writeln!(io::stderr(), "{}", line);
            }
            ConsoleTarget::Writer(writer) => {
                let mut writer = writer.clone();
                let _ = writeln!(writer, "{}", line).and_then(|_| writer.flush());
            }
        }
    }
}

impl fmt::Debug for ConsoleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleTarget::Stderr => f.write_str("Stderr"),
            ConsoleTarget::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Cloneable handle to a writer shared between handlers.
#[derive(Clone)]
pub struct SharedWriter(Arc<Mutex<dyn Write + Send>>);

impl SharedWriter {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self(Arc::new(Mutex::new(writer)))
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.0.lock() {
            Ok(mut writer) => writer.write(buf),
            Err(poisoned) => poisoned.into_inner().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.0.lock() {
            Ok(mut writer) => writer.flush(),
            Err(poisoned) => poisoned.into_inner().flush(),
        }
    }
}

/// Growable in-memory console. Clones share the same bytes.
#[derive(Clone, Default)]
pub struct ConsoleBuffer(Arc<Mutex<Vec<u8>>>);

impl ConsoleBuffer {
    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for ConsoleBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) enum Handler {
    Discard,
    Writer(env_logger::Logger),
}

impl Handler {
    pub(crate) fn open(spec: &HandlerSpec, console: &ConsoleTarget) -> LogResult<Self> {
        let handler = match spec {
            HandlerSpec::Discard => Handler::Discard,
            HandlerSpec::Console { level, format } => {
                Handler::Writer(build_logger(console.env_target(), *level, *format))
            }
            HandlerSpec::RotatingFile {
                path,
                rotation,
                level,
                format,
            } => {
                let file = open_rotating(path, *rotation)?;
                Handler::Writer(build_logger(
                    Target::Pipe(Box::new(file)),
                    *level,
                    *format,
                ))
            }
        };
        Ok(handler)
    }

    pub(crate) fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        match self {
            Handler::Discard => false,
            Handler::Writer(logger) => logger.enabled(metadata),
        }
    }

    pub(crate) fn log(&self, record: &Record<'_>) {
        if let Handler::Writer(logger) = self {
            logger.log(record);
        }
    }

    pub(crate) fn flush(&self) {
        if let Handler::Writer(logger) = self {
            logger.flush();
        }
    }
}

/// Opens a size-rotated file sink.
///
/// The file is opened once up front so an unusable path is reported here;
/// parent directories are never created. Rotation happens between writes,
/// so a record is never split across two files.
fn open_rotating(path: &Path, rotation: RotationPolicy) -> LogResult<FileRotate<AppendCount>> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::PathUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(FileRotate::new(
        path,
        AppendCount::new(rotation.backup_count),
        ContentLimit::BytesSurpassed(rotation.max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    ))
}

fn build_logger(target: Target, level: LevelFilter, format: RecordFormat) -> env_logger::Logger {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .target(target)
        .write_style(WriteStyle::Never);
    match format {
        RecordFormat::Standard => builder.format(write_standard),
        RecordFormat::Command => builder.format(write_command),
    };
    builder.build()
}

fn write_standard(buf: &mut Formatter, record: &Record<'_>) -> io::Result<()> {
    let timestamp = buf.timestamp_millis();
    writeln!(buf, "{} [{}] {}", timestamp, record.level(), record.args())
}

fn write_command(buf: &mut Formatter, record: &Record<'_>) -> io::Result<()> {
    let timestamp = buf.timestamp_millis();
    writeln!(
        buf,
        "{} P{} [{}] {}",
        timestamp,
        std::process::id(),
        record.level(),
        record.args()
    )
}
