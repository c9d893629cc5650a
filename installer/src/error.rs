//! Error types for the shimsmith command-line front end.
//!
//! Launcher failures from the core library pass through unchanged; the
//! remaining variants describe problems with the files the front end reads
//! and writes on the library's behalf.

use camino::Utf8PathBuf;
use shimsmith::error::LauncherError;
use thiserror::Error;

/// Errors that can occur while running a front-end command.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// A launcher operation failed.
    #[error(transparent)]
    Launcher(#[from] LauncherError),

    /// An input file could not be read.
    #[error("failed to read {path}")]
    ReadFailed {
        /// Path of the unreadable file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The entry-point manifest is not valid TOML or has unexpected keys.
    #[error("invalid entry-point manifest {path}: {reason}")]
    ManifestParse {
        /// Path to the manifest.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The installed-file record could not be updated.
    #[error("failed to update record {path}")]
    RecordWrite {
        /// Path to the record file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Windows launchers were requested without stub executables.
    #[error("Windows targets need stub executables; pass --stub-dir with cli.exe and gui.exe")]
    MissingStubs,

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
