//! Physical log file locations.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LogError, LogResult};

pub const WIRE_LOG_FILE: &str = "cfn-wire.log";
pub const CMD_LOG_FILE: &str = "cfn-init-cmd.log";
pub const POSIX_LOG_DIR: &str = "/var/log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// Resolves `filename` against the override directory or the platform default.
pub fn resolve_path(log_dir: Option<&Path>, filename: &str) -> LogResult<PathBuf> {
    let system_drive = std::env::var("SystemDrive").ok();
    resolve_path_for(
        Platform::current(),
        system_drive.as_deref(),
        log_dir,
        filename,
    )
}

/// Like [`resolve_path`] with the platform and `%SystemDrive%` given
/// explicitly. The drive is only consulted on Windows without an override.
pub fn resolve_path_for(
    platform: Platform,
    system_drive: Option<&str>,
    log_dir: Option<&Path>,
    filename: &str,
) -> LogResult<PathBuf> {
    if let Some(dir) = log_dir {
        return Ok(dir.join(filename));
    }
    match platform {
        Platform::Posix => Ok(Path::new(POSIX_LOG_DIR).join(filename)),
        Platform::Windows => {
            let dir = windows_log_dir(system_drive);
            if !dir.exists() {
                fs::create_dir_all(&dir).map_err(|source| LogError::DirectoryCreation {
                    path: dir.clone(),
                    source,
                })?;
            }
            Ok(dir.join(filename))
        }
    }
}

/// `%SystemDrive%\cfn\log`; the drive defaults to `C:`.
pub fn windows_log_dir(system_drive: Option<&str>) -> PathBuf {
    let drive = system_drive.filter(|d| !d.is_empty()).unwrap_or("C:");
    PathBuf::from(format!("{}\\cfn\\log", drive))
}
