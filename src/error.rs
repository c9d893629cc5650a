//! Error types for launcher generation and repair.
//!
//! Malformed declarations and configuration mistakes are fatal and carry the
//! offending value. Filesystem failures are propagated unmodified through
//! [`LauncherError::Io`] so callers can decide whether to abort an install.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or repairing launchers.
#[derive(Debug, Error)]
pub enum LauncherError {
    /// An entry-point declaration did not split into a module and a callable.
    #[error("invalid entry point {name} = {declaration:?}: {reason}")]
    InvalidEntryPoint {
        /// Name the entry point was declared under.
        name: String,
        /// The raw declaration string.
        declaration: String,
        /// Description of the violated constraint.
        reason: &'static str,
    },

    /// A launcher variant name outside `console_scripts` and `gui_scripts`.
    #[error("unsupported launcher variant {value:?}; expected console_scripts or gui_scripts")]
    UnsupportedLauncherVariant {
        /// The rejected variant name.
        value: String,
    },

    /// The requested operation only exists for another target platform.
    #[error("{operation} is only supported for Windows targets")]
    UnsupportedPlatform {
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// A proxy source does not name a Windows executable.
    #[error("proxy source {path} is not a Windows executable")]
    InvalidProxySource {
        /// The rejected source path.
        path: Utf8PathBuf,
    },

    /// A `files_to_install` line could not be parsed.
    #[error("invalid install instruction {line:?}: expected `<archive path> <action>`")]
    InvalidInstruction {
        /// The offending manifest line.
        line: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`LauncherError`].
pub type Result<T> = std::result::Result<T, LauncherError>;
