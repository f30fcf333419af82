//! Post-creation hardening of log file permissions.

use std::io;
use std::path::Path;

/// Upper bound for a log file's mode: owner rwx, group and other r-x.
pub const PERMISSION_MASK: u32 = 0o755;

/// Applies the mask to a raw mode; file type bits are dropped.
pub fn capped_mode(mode: u32) -> u32 {
    mode & 0o7777 & PERMISSION_MASK
}

/// Clears group/other write bits (and anything else outside 0o755).
#[cfg(unix)]
pub fn tighten_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(capped_mode(perms.mode()));
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
pub fn tighten_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
