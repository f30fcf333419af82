use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type LogResult<T> = std::result::Result<T, LogError>;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Could not open {} for logging: {source}", .path.display())]
    PathUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not create log directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The console configuration could not be applied after the primary one
    /// failed. Console and discard handlers open without I/O, so this only
    /// wraps errors from handlers that touch the filesystem.
    #[error("Console logging fallback failed: {0}")]
    FallbackApplication(#[source] Box<LogError>),

    #[error("Unknown log level: {0}")]
    InvalidLevel(String),

    #[error("Invalid logging options: {0}")]
    Config(String),

    #[error("A global logger is already installed")]
    GlobalLoggerSet,
}

impl LogError {
    /// True for failures the initializer recovers from by switching to the console.
    pub fn is_path_unavailable(&self) -> bool {
        matches!(self, LogError::PathUnavailable { .. })
    }
}
