//! Platform launcher layouts.
//!
//! A launcher is either a single `#!` script (POSIX) or a binary stub plus a
//! companion script that the stub finds by name (Windows). The two shapes are
//! [`LauncherStrategy`] implementations chosen once per install by
//! [`select_strategy`], so exactly one shape is ever produced for a context.

use crate::context::LauncherContext;
use crate::error::Result;
use crate::fs::{is_in_use, remove_if_exists};
use crate::stub::BinaryWriter;
use crate::variant::LauncherVariant;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;

/// Suffix inserted between a launcher name and its companion script extension.
pub const COMPANION_SUFFIX: &str = "-script";

/// Extension of Windows stub executables.
pub const STUB_EXTENSION: &str = "exe";

/// The files making up one launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherLayout {
    /// The native stub, present only on Windows.
    pub stub: Option<Utf8PathBuf>,
    /// The interpreter script.
    pub script: Utf8PathBuf,
}

impl LauncherLayout {
    /// Every path in creation order: stub first, then script.
    #[must_use]
    pub fn paths(&self) -> Vec<Utf8PathBuf> {
        self.stub
            .iter()
            .cloned()
            .chain(std::iter::once(self.script.clone()))
            .collect()
    }
}

/// Decides where a launcher's files live and writes its native part.
pub trait LauncherStrategy {
    /// Compute the layout for a launcher whose user-facing path is
    /// `destination` (without extension).
    fn layout(&self, destination: &Utf8Path, variant: LauncherVariant) -> LauncherLayout;

    /// Write the stub part of `layout`, if the platform needs one.
    ///
    /// # Errors
    ///
    /// Returns an error if the stub cannot be written.
    fn write_stub(&self, layout: &LauncherLayout, variant: LauncherVariant) -> Result<()>;
}

/// POSIX launchers: the script itself sits at the user-facing path.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixShebangLauncher;

impl LauncherStrategy for UnixShebangLauncher {
    fn layout(&self, destination: &Utf8Path, _variant: LauncherVariant) -> LauncherLayout {
        LauncherLayout {
            stub: None,
            script: destination.to_owned(),
        }
    }

    fn write_stub(&self, _layout: &LauncherLayout, _variant: LauncherVariant) -> Result<()> {
        Ok(())
    }
}

/// Windows launchers: `name.exe` runs `name-script.py` or `name-script.pyw`.
pub struct WindowsStubLauncher<'a> {
    writer: &'a dyn BinaryWriter,
}

impl<'a> WindowsStubLauncher<'a> {
    /// Create a strategy that places stubs with `writer`.
    #[must_use]
    pub const fn new(writer: &'a dyn BinaryWriter) -> Self {
        Self { writer }
    }
}

impl LauncherStrategy for WindowsStubLauncher<'_> {
    fn layout(&self, destination: &Utf8Path, variant: LauncherVariant) -> LauncherLayout {
        LauncherLayout {
            stub: Some(Utf8PathBuf::from(format!("{destination}.{STUB_EXTENSION}"))),
            script: companion_path(destination, variant),
        }
    }

    fn write_stub(&self, layout: &LauncherLayout, variant: LauncherVariant) -> Result<()> {
        let Some(stub) = layout.stub.as_deref() else {
            return Ok(());
        };
        // A running stub cannot be unlinked on Windows (sharing violation or
        // access denied) but can still be overwritten in place.
        match remove_if_exists(stub) {
            Ok(()) => {}
            Err(e) if is_in_use(&e) || is_file(stub) => {
                debug!("write_stub: cannot remove stub {stub}, overwriting in place: {e}");
            }
            Err(e) => return Err(e.into()),
        }
        self.writer.write_binary(stub, variant)
    }
}

fn is_file(path: &Utf8Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|metadata| metadata.is_file())
}

/// Path of the companion script a Windows stub at `destination.exe` runs.
#[must_use]
pub fn companion_path(destination: &Utf8Path, variant: LauncherVariant) -> Utf8PathBuf {
    Utf8PathBuf::from(format!(
        "{destination}{COMPANION_SUFFIX}.{}",
        variant.script_extension()
    ))
}

/// Pick the launcher shape for `ctx`'s target platform.
#[must_use]
pub fn select_strategy<'a>(
    ctx: &LauncherContext,
    writer: &'a dyn BinaryWriter,
) -> Box<dyn LauncherStrategy + 'a> {
    if ctx.platform().is_windows() {
        Box::new(WindowsStubLauncher::new(writer))
    } else {
        Box::new(UnixShebangLauncher)
    }
}
