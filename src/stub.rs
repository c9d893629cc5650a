//! Binary stub placement for Windows launchers.
//!
//! Windows cannot execute an interpreter script from a shell, so each
//! launcher gets a small native executable that locates its companion script
//! by name and runs it. The stub bytes are fixed: one payload for console
//! programs and one for windowed programs. This module copies them; it never
//! builds executables.

use crate::error::Result;
use crate::fs::{is_in_use, make_executable};
use crate::variant::LauncherVariant;
use camino::Utf8Path;
use log::debug;
use std::borrow::Cow;
use std::fs;

/// File name of the console stub inside a payload directory.
pub const CONSOLE_STUB_NAME: &str = "cli.exe";

/// File name of the windowed stub inside a payload directory.
pub const GUI_STUB_NAME: &str = "gui.exe";

/// The two stub executables, selected by [`LauncherVariant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubPayloads {
    console: Cow<'static, [u8]>,
    gui: Cow<'static, [u8]>,
}

impl StubPayloads {
    /// Create payloads from explicit bytes.
    #[must_use]
    pub fn new(
        console: impl Into<Cow<'static, [u8]>>,
        gui: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        Self {
            console: console.into(),
            gui: gui.into(),
        }
    }

    /// Load `cli.exe` and `gui.exe` from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read.
    pub fn from_dir(dir: &Utf8Path) -> Result<Self> {
        let console = fs::read(dir.join(CONSOLE_STUB_NAME))?;
        let gui = fs::read(dir.join(GUI_STUB_NAME))?;
        Ok(Self::new(console, gui))
    }

    /// Payloads compiled in from `$SHIMSMITH_STUB_DIR` at build time.
    #[cfg(feature = "embedded-stubs")]
    #[must_use]
    pub fn embedded() -> Self {
        Self::new(
            include_bytes!(concat!(env!("SHIMSMITH_STUB_DIR"), "/cli.exe")).as_slice(),
            include_bytes!(concat!(env!("SHIMSMITH_STUB_DIR"), "/gui.exe")).as_slice(),
        )
    }

    /// The bytes written for `variant`.
    #[must_use]
    pub fn payload(&self, variant: LauncherVariant) -> &[u8] {
        match variant {
            LauncherVariant::Console => &self.console,
            LauncherVariant::Gui => &self.gui,
        }
    }
}

/// Writes stub executables to launcher destinations.
#[cfg_attr(test, mockall::automock)]
pub trait BinaryWriter {
    /// Write the stub for `variant` to `destination` and mark it executable.
    ///
    /// # Errors
    ///
    /// Returns an error if the stub cannot be written or its permissions
    /// cannot be set.
    fn write_binary(&self, destination: &Utf8Path, variant: LauncherVariant) -> Result<()>;
}

/// [`BinaryWriter`] that copies bytes from a [`StubPayloads`] set.
#[derive(Debug, Clone)]
pub struct LauncherBinaryWriter {
    payloads: StubPayloads,
}

impl LauncherBinaryWriter {
    /// Create a writer over `payloads`.
    #[must_use]
    pub const fn new(payloads: StubPayloads) -> Self {
        Self { payloads }
    }
}

impl BinaryWriter for LauncherBinaryWriter {
    fn write_binary(&self, destination: &Utf8Path, variant: LauncherVariant) -> Result<()> {
        match fs::write(destination, self.payloads.payload(variant)) {
            Ok(()) => {}
            // A stub that is currently executing is already the same bytes.
            Err(e) if is_in_use(&e) => {
                debug!("write_binary: {destination} is in use, keeping existing stub: {e}");
            }
            Err(e) => return Err(e.into()),
        }
        make_executable(destination)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LauncherError;
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn payloads() -> StubPayloads {
        StubPayloads::new(b"MZ-console".as_slice(), b"MZ-gui".as_slice())
    }

    fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir path not UTF-8")
    }

    #[rstest]
    #[case(LauncherVariant::Console, b"MZ-console".as_slice())]
    #[case(LauncherVariant::Gui, b"MZ-gui".as_slice())]
    fn writes_payload_for_variant(
        payloads: StubPayloads,
        #[case] variant: LauncherVariant,
        #[case] expected: &[u8],
    ) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = utf8_dir(&temp).join("tool.exe");

        LauncherBinaryWriter::new(payloads)
            .write_binary(&dest, variant)
            .expect("stub write");

        assert_eq!(fs::read(&dest).expect("read stub"), expected);
    }

    #[rstest]
    fn overwrites_existing_stub(payloads: StubPayloads) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = utf8_dir(&temp).join("tool.exe");
        fs::write(&dest, b"stale stub with longer content").expect("seed stub");

        LauncherBinaryWriter::new(payloads)
            .write_binary(&dest, LauncherVariant::Console)
            .expect("stub write");

        assert_eq!(fs::read(&dest).expect("read stub"), b"MZ-console");
    }

    #[cfg(unix)]
    #[rstest]
    fn stub_is_executable(payloads: StubPayloads) {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = utf8_dir(&temp).join("tool.exe");

        LauncherBinaryWriter::new(payloads)
            .write_binary(&dest, LauncherVariant::Gui)
            .expect("stub write");

        let mode = fs::metadata(&dest).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[rstest]
    fn missing_parent_directory_propagates(payloads: StubPayloads) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = utf8_dir(&temp).join("missing").join("tool.exe");

        let err = LauncherBinaryWriter::new(payloads)
            .write_binary(&dest, LauncherVariant::Console)
            .expect_err("missing parent must fail");

        assert!(matches!(
            err,
            LauncherError::Io(source) if source.kind() == std::io::ErrorKind::NotFound
        ));
    }

    #[cfg(unix)]
    #[rstest]
    fn running_stub_is_kept(payloads: StubPayloads) {
        use std::os::unix::fs::PermissionsExt;
        use std::process::Command;

        let sleep = std::path::Path::new("/bin/sleep");
        if !sleep.is_file() {
            return;
        }
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = utf8_dir(&temp).join("tool.exe");
        fs::copy(sleep, &dest).expect("copy sleep");
        fs::set_permissions(&dest, fs::Permissions::from_mode(0o755)).expect("chmod");

        // Another thread forking while the copy was open can briefly hold it busy.
        let mut attempts = 0;
        let mut child = loop {
            match Command::new(dest.as_std_path()).arg("5").spawn() {
                Ok(child) => break child,
                Err(e) if e.raw_os_error() == Some(libc::ETXTBSY) && attempts < 10 => {
                    attempts += 1;
                    std::thread::sleep(std::time::Duration::from_millis(50));
                }
                Err(e) => panic!("failed to spawn copied sleep: {e}"),
            }
        };

        let result = LauncherBinaryWriter::new(payloads).write_binary(&dest, LauncherVariant::Console);

        child.kill().expect("kill sleep");
        child.wait().expect("reap sleep");
        assert!(result.is_ok(), "unexpected error: {result:?}");
        assert!(dest.is_file());
    }

    #[test]
    fn from_dir_loads_both_payloads() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = utf8_dir(&temp);
        fs::write(dir.join(CONSOLE_STUB_NAME), b"cli").expect("write cli");
        fs::write(dir.join(GUI_STUB_NAME), b"gui").expect("write gui");

        let payloads = StubPayloads::from_dir(&dir).expect("load payloads");

        assert_eq!(payloads.payload(LauncherVariant::Console), b"cli");
        assert_eq!(payloads.payload(LauncherVariant::Gui), b"gui");
    }

    #[test]
    fn from_dir_fails_without_gui_stub() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = utf8_dir(&temp);
        fs::write(dir.join(CONSOLE_STUB_NAME), b"cli").expect("write cli");

        assert!(StubPayloads::from_dir(&dir).is_err());
    }
}
