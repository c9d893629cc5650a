//! Filesystem primitives shared by the launcher writers.

use camino::Utf8Path;
use std::fs;
use std::io;

/// Remove whatever currently exists at `path`.
///
/// Symlinks are removed rather than followed so a stale link never redirects
/// a subsequent write. A missing path is not an error.
///
/// # Errors
///
/// Returns any I/O error other than [`io::ErrorKind::NotFound`].
pub fn remove_if_exists(path: &Utf8Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Mark `path` as executable for owner, group and others (rwxr-xr-x).
///
/// # Errors
///
/// Returns an error if the permissions cannot be read or updated.
#[cfg(unix)]
pub fn make_executable(path: &Utf8Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

/// Windows has no execute bits; executability follows the file extension.
///
/// # Errors
///
/// Never fails on this platform.
#[cfg(not(unix))]
pub fn make_executable(_path: &Utf8Path) -> io::Result<()> {
    Ok(())
}

/// Replace `path` with an executable text script.
///
/// Any existing file or symlink at `path` is deleted first rather than
/// written through.
///
/// # Errors
///
/// Returns an error if removal, writing or the permission update fails.
pub fn write_executable_script(path: &Utf8Path, content: &str) -> io::Result<()> {
    remove_if_exists(path)?;
    fs::write(path, content)?;
    make_executable(path)
}

/// Returns true when `err` reports that the file is held open for execution.
///
/// This happens when an installer replaces the stub it is itself running
/// from.
#[must_use]
pub fn is_in_use(err: &io::Error) -> bool {
    #[cfg(windows)]
    const IN_USE_CODES: &[i32] = &[32, 33]; // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    #[cfg(unix)]
    const IN_USE_CODES: &[i32] = &[libc::ETXTBSY];
    #[cfg(not(any(unix, windows)))]
    const IN_USE_CODES: &[i32] = &[];

    err.raw_os_error()
        .is_some_and(|code| IN_USE_CODES.contains(&code))
}
