//! The installed-file record.
//!
//! A record is a plain text file listing one installed path per line. Install
//! commands append to it so an uninstaller can later remove what was written;
//! `repair` reads it to find the scripts to examine.

use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::OpenOptions;
use std::io::Write;

/// Read the paths listed in the record at `path`, skipping blank lines.
///
/// # Errors
///
/// Returns [`InstallerError::ReadFailed`] if the record cannot be read.
pub fn read_record(path: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let contents = std::fs::read_to_string(path).map_err(|source| InstallerError::ReadFailed {
        path: path.to_owned(),
        source,
    })?;
    Ok(contents
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(Utf8PathBuf::from)
        .collect())
}

/// Append `paths` to the record at `path`, creating it if necessary.
///
/// # Errors
///
/// Returns [`InstallerError::RecordWrite`] if the record cannot be opened or
/// written.
pub fn append_record(path: &Utf8Path, paths: &[Utf8PathBuf]) -> Result<()> {
    let to_error = |source| InstallerError::RecordWrite {
        path: path.to_owned(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)?;
    for installed in paths {
        writeln!(file, "{installed}").map_err(to_error)?;
    }
    Ok(())
}
