//! Entry-point script generation.
//!
//! The generated script is a fixed template: an interpreter directive, a
//! comment naming this tool and the owning package, and a `__main__` block
//! that imports the declared callable and exits with its return value. The
//! import is resolved by the interpreter when the launcher runs, not here.

use crate::context::{LauncherContext, quote_interpreter};
use crate::entry_point::EntryPoint;
use crate::error::Result;
use crate::fs::write_executable_script;
use crate::launcher::{LauncherStrategy, select_strategy};
use crate::stub::BinaryWriter;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// Token present in every script this crate generates.
///
/// The repairer leaves files containing it alone.
pub const GENERATOR_MARKER: &str = " shimsmith ";

const CONSOLE_INTERPRETER: &str = "python.exe";
const WINDOWED_INTERPRETER: &str = "pythonw.exe";

/// Writes launchers for entry points.
pub struct ScriptWriter<'a> {
    ctx: &'a LauncherContext,
    strategy: Box<dyn LauncherStrategy + 'a>,
}

impl<'a> ScriptWriter<'a> {
    /// Create a writer for `ctx`, placing Windows stubs with `binary_writer`.
    ///
    /// `binary_writer` is never called for POSIX targets.
    #[must_use]
    pub fn new(ctx: &'a LauncherContext, binary_writer: &'a dyn BinaryWriter) -> Self {
        Self {
            ctx,
            strategy: select_strategy(ctx, binary_writer),
        }
    }

    /// Write the launcher for `entry_point` at the user-facing path
    /// `destination` and return every file created, in creation order.
    ///
    /// On POSIX the script is written to `destination` itself. On Windows a
    /// stub is written to `destination.exe` followed by the companion script
    /// `destination-script.py` (or `.pyw` for windowed entry points).
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be removed, written or made
    /// executable.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use camino::Utf8Path;
    /// use shimsmith::context::{LauncherContext, TargetPlatform};
    /// use shimsmith::entry_point::EntryPoint;
    /// use shimsmith::script::ScriptWriter;
    /// use shimsmith::stub::{LauncherBinaryWriter, StubPayloads};
    /// use shimsmith::variant::LauncherVariant;
    ///
    /// let ctx = LauncherContext::new("/opt/py/bin/python", "/opt/py/bin")
    ///     .with_platform(TargetPlatform::Posix)
    ///     .with_owner_label("tool-1.0.egg");
    /// let stubs = LauncherBinaryWriter::new(StubPayloads::new(Vec::<u8>::new(), Vec::<u8>::new()));
    /// let entry = EntryPoint::parse("tool", "tool.cli:main", LauncherVariant::Console)?;
    ///
    /// let written = ScriptWriter::new(&ctx, &stubs)
    ///     .write_entry_point_script(Utf8Path::new("/opt/py/bin/tool"), &entry)?;
    /// assert_eq!(written.len(), 1);
    /// # Ok::<(), shimsmith::error::LauncherError>(())
    /// ```
    pub fn write_entry_point_script(
        &self,
        destination: &Utf8Path,
        entry_point: &EntryPoint,
    ) -> Result<Vec<Utf8PathBuf>> {
        let variant = entry_point.variant();
        let layout = self.strategy.layout(destination, variant);

        self.strategy.write_stub(&layout, variant)?;

        if self.ctx.verbose() {
            info!("Creating script: {}", layout.script);
        }
        let interpreter = script_interpreter(self.ctx, &layout.script);
        let content = render_entry_point_script(entry_point, &interpreter, self.ctx.owner_label());
        write_executable_script(&layout.script, &content)?;

        Ok(layout.paths())
    }
}

/// The `#!` invocation for a script written to `script_path`.
///
/// Windowed (`.pyw`) scripts on Windows use `pythonw.exe` in place of
/// `python.exe` so no console window opens.
#[must_use]
pub fn script_interpreter(ctx: &LauncherContext, script_path: &Utf8Path) -> String {
    let interpreter = ctx.interpreter().as_str();
    let windowed = ctx.platform().is_windows()
        && script_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pyw"));

    if windowed {
        quote_interpreter(&windowed_interpreter(interpreter), ctx.platform())
    } else {
        quote_interpreter(interpreter, ctx.platform())
    }
}

/// Swap a trailing `python.exe` (any case) for `pythonw.exe`.
fn windowed_interpreter(interpreter: &str) -> String {
    let split = interpreter.len().saturating_sub(CONSOLE_INTERPRETER.len());
    match (interpreter.get(..split), interpreter.get(split..)) {
        (Some(head), Some(tail)) if tail.eq_ignore_ascii_case(CONSOLE_INTERPRETER) => {
            format!("{head}{WINDOWED_INTERPRETER}")
        }
        _ => interpreter.to_owned(),
    }
}

/// Render the script text for `entry_point`.
#[must_use]
pub fn render_entry_point_script(
    entry_point: &EntryPoint,
    interpreter: &str,
    owner_label: &str,
) -> String {
    let module = entry_point.module();
    let callable = entry_point.callable();
    format!(
        "#!{interpreter}
# This script was created by shimsmith when installing:
#
#   {owner_label}
#
if __name__ == '__main__':
    import sys
    from {module} import {callable}

    sys.exit({callable}())
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TargetPlatform;
    use crate::stub::MockBinaryWriter;
    use crate::variant::LauncherVariant;
    use rstest::{fixture, rstest};
    use std::fs;
    use tempfile::TempDir;

    struct Sandbox {
        _temp: TempDir,
        bin_dir: Utf8PathBuf,
    }

    #[fixture]
    fn sandbox() -> Sandbox {
        let temp = TempDir::new().expect("failed to create temp dir");
        let bin_dir =
            Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir path not UTF-8");
        Sandbox {
            _temp: temp,
            bin_dir,
        }
    }

    fn posix_ctx(bin_dir: &Utf8Path) -> LauncherContext {
        LauncherContext::new("/opt/py/bin/python", bin_dir)
            .with_platform(TargetPlatform::Posix)
            .with_owner_label("tool-1.0-1.egg")
    }

    fn windows_ctx(bin_dir: &Utf8Path) -> LauncherContext {
        LauncherContext::new(r"C:\Python27\python.exe", bin_dir)
            .with_platform(TargetPlatform::Windows)
            .with_owner_label("tool-1.0-1.egg")
    }

    fn stub_writer(expected_calls: usize) -> MockBinaryWriter {
        let mut writer = MockBinaryWriter::new();
        writer
            .expect_write_binary()
            .times(expected_calls)
            .returning(|path, _| {
                fs::write(path, b"MZ")?;
                Ok(())
            });
        writer
    }

    #[test]
    fn rendered_script_imports_and_invokes_callable() {
        let entry = EntryPoint::parse("tool", "tool.cli:main", LauncherVariant::Console)
            .expect("valid entry point");
        let script = render_entry_point_script(&entry, "/usr/bin/python", "tool-1.0.egg");

        assert_eq!(
            script,
            concat!(
                "#!/usr/bin/python\n",
                "# This script was created by shimsmith when installing:\n",
                "#\n",
                "#   tool-1.0.egg\n",
                "#\n",
                "if __name__ == '__main__':\n",
                "    import sys\n",
                "    from tool.cli import main\n",
                "\n",
                "    sys.exit(main())\n",
            )
        );
        assert!(script.contains(GENERATOR_MARKER));
    }

    #[rstest]
    fn posix_writes_single_executable_script(sandbox: Sandbox) {
        let ctx = posix_ctx(&sandbox.bin_dir);
        let stubs = stub_writer(0);
        let entry = EntryPoint::parse("tool", "tool.cli:main", LauncherVariant::Gui)
            .expect("valid entry point");
        let destination = sandbox.bin_dir.join("tool");

        let written = ScriptWriter::new(&ctx, &stubs)
            .write_entry_point_script(&destination, &entry)
            .expect("script write");

        assert_eq!(written, vec![destination.clone()]);
        let content = fs::read_to_string(&destination).expect("read script");
        assert!(content.starts_with("#!/opt/py/bin/python\n"));
        assert!(content.contains("from tool.cli import main"));

        let entries = fs::read_dir(&sandbox.bin_dir).expect("read dir").count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[rstest]
    fn posix_script_is_executable(sandbox: Sandbox) {
        use std::os::unix::fs::PermissionsExt;

        let ctx = posix_ctx(&sandbox.bin_dir);
        let stubs = stub_writer(0);
        let entry = EntryPoint::parse("tool", "tool.cli:main", LauncherVariant::Console)
            .expect("valid entry point");
        let destination = sandbox.bin_dir.join("tool");

        ScriptWriter::new(&ctx, &stubs)
            .write_entry_point_script(&destination, &entry)
            .expect("script write");

        let mode = fs::metadata(&destination)
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[rstest]
    #[case(LauncherVariant::Console, "tool-script.py", r#"#!"C:\Python27\python.exe""#)]
    #[case(LauncherVariant::Gui, "tool-script.pyw", r#"#!"C:\Python27\pythonw.exe""#)]
    fn windows_writes_stub_then_companion(
        sandbox: Sandbox,
        #[case] variant: LauncherVariant,
        #[case] companion: &str,
        #[case] directive: &str,
    ) {
        let ctx = windows_ctx(&sandbox.bin_dir);
        let stubs = stub_writer(1);
        let entry = EntryPoint::parse("tool", "tool.app:run", variant).expect("valid entry point");

        let written = ScriptWriter::new(&ctx, &stubs)
            .write_entry_point_script(&sandbox.bin_dir.join("tool"), &entry)
            .expect("launcher write");

        assert_eq!(
            written,
            vec![sandbox.bin_dir.join("tool.exe"), sandbox.bin_dir.join(companion)]
        );
        let content = fs::read_to_string(sandbox.bin_dir.join(companion)).expect("read script");
        assert_eq!(content.lines().next(), Some(directive));
    }

    #[rstest]
    fn rewriting_is_idempotent(sandbox: Sandbox) {
        let ctx = posix_ctx(&sandbox.bin_dir);
        let stubs = stub_writer(0);
        let writer = ScriptWriter::new(&ctx, &stubs);
        let entry = EntryPoint::parse("tool", "tool.cli:main", LauncherVariant::Console)
            .expect("valid entry point");
        let destination = sandbox.bin_dir.join("tool");

        let first = writer
            .write_entry_point_script(&destination, &entry)
            .expect("first write");
        let first_bytes = fs::read(&destination).expect("read script");
        let second = writer
            .write_entry_point_script(&destination, &entry)
            .expect("second write");

        assert_eq!(first, second);
        assert_eq!(fs::read(&destination).expect("read script"), first_bytes);
    }

    #[rstest]
    #[case::lowercase(r"C:\Py\python.exe", r"C:\Py\pythonw.exe")]
    #[case::uppercase(r"C:\Py\PYTHON.EXE", r"C:\Py\pythonw.exe")]
    #[case::other_name(r"C:\Py\py.exe", r"C:\Py\py.exe")]
    #[case::short("exe", "exe")]
    fn windowed_interpreter_swaps_console_binary(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(windowed_interpreter(input), expected);
    }

    #[test]
    fn posix_never_uses_windowed_interpreter() {
        let ctx = LauncherContext::new("/opt/python.exe", "/opt")
            .with_platform(TargetPlatform::Posix);
        assert_eq!(
            script_interpreter(&ctx, Utf8Path::new("/opt/tool-script.pyw")),
            "/opt/python.exe"
        );
    }
}
