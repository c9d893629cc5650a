//! Proxy launchers for prebuilt executables.
//!
//! Some packages ship a ready-made Windows executable that must appear on the
//! search path under a package-controlled name. The proxy is a console stub
//! plus a companion script that runs the real executable with the caller's
//! arguments and exits with its status.

use crate::context::LauncherContext;
use crate::error::{LauncherError, Result};
use crate::fs::write_executable_script;
use crate::launcher::{LauncherStrategy, WindowsStubLauncher};
use crate::stub::BinaryWriter;
use crate::variant::LauncherVariant;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

/// Installs proxy launchers into a binary directory.
pub struct ProxyInstaller<'a> {
    ctx: &'a LauncherContext,
    strategy: WindowsStubLauncher<'a>,
}

impl<'a> ProxyInstaller<'a> {
    /// Create an installer for `ctx`, placing stubs with `binary_writer`.
    #[must_use]
    pub const fn new(ctx: &'a LauncherContext, binary_writer: &'a dyn BinaryWriter) -> Self {
        Self {
            ctx,
            strategy: WindowsStubLauncher::new(binary_writer),
        }
    }

    /// Install a proxy for `source` in `bin_dir`, returning the stub path
    /// followed by the companion script path.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::UnsupportedPlatform`] for POSIX targets,
    /// [`LauncherError::InvalidProxySource`] when `source` is not an `.exe`,
    /// and any I/O error raised while writing.
    pub fn install_proxy(&self, source: &Utf8Path, bin_dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        if !self.ctx.platform().is_windows() {
            return Err(LauncherError::UnsupportedPlatform {
                operation: "proxy installation",
            });
        }
        if self.ctx.verbose() {
            info!("Creating proxy executable to: {source}");
        }

        let stem = proxy_stem(source, self.ctx.stripped_prefixes())?;
        let layout = self
            .strategy
            .layout(&bin_dir.join(stem), LauncherVariant::Console);
        self.strategy.write_stub(&layout, LauncherVariant::Console)?;

        let content = render_proxy_script(&self.ctx.interpreter_invocation(), source);
        write_executable_script(&layout.script, &content)?;

        Ok(layout.paths())
    }
}

/// The destination name of a proxy for `source`, without the `.exe`
/// extension and with the first matching prefix removed.
///
/// # Errors
///
/// Returns [`LauncherError::InvalidProxySource`] unless the file name ends in
/// `.exe` (any case) and leaves a non-empty name.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use shimsmith::proxy::proxy_stem;
///
/// let stem = proxy_stem(Utf8Path::new(r"C:\Py\EGG-INFO\epd-toolx.exe"), &["epd-".to_owned()])?;
/// assert_eq!(stem, "toolx");
/// # Ok::<(), shimsmith::error::LauncherError>(())
/// ```
pub fn proxy_stem(source: &Utf8Path, stripped_prefixes: &[String]) -> Result<String> {
    let invalid = || LauncherError::InvalidProxySource {
        path: source.to_owned(),
    };

    let file_name = base_name(source.as_str());
    let split = file_name.len().checked_sub(".exe".len()).ok_or_else(invalid)?;
    let (stem, extension) = match (file_name.get(..split), file_name.get(split..)) {
        (Some(stem), Some(extension)) => (stem, extension),
        _ => return Err(invalid()),
    };
    if !extension.eq_ignore_ascii_case(".exe") {
        return Err(invalid());
    }

    let stem = stripped_prefixes
        .iter()
        .find_map(|prefix| stem.strip_prefix(prefix.as_str()))
        .unwrap_or(stem);
    if stem.is_empty() {
        return Err(invalid());
    }
    Ok(stem.to_owned())
}

/// Final path component, treating both `/` and `\` as separators so Windows
/// sources resolve the same way on every host.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Render the companion script that forwards to `source`.
#[must_use]
pub fn render_proxy_script(interpreter: &str, source: &Utf8Path) -> String {
    let source = python_string_literal(source.as_str());
    format!(
        "#!{interpreter}
# This proxy was created by shimsmith from a package with special instructions
#
import sys
import subprocess

src = {source}

sys.exit(subprocess.call([src] + sys.argv[1:]))
"
    )
}

/// Quote `value` as a single-quoted Python string literal.
fn python_string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '\'' => literal.push_str("\\'"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            other => literal.push(other),
        }
    }
    literal.push('\'');
    literal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TargetPlatform;
    use crate::stub::MockBinaryWriter;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn prefixes() -> Vec<String> {
        vec!["epd-".to_owned()]
    }

    #[rstest]
    #[case::prefixed("epd-toolx.exe", "toolx")]
    #[case::plain("toolx.exe", "toolx")]
    #[case::upper_extension("TOOLX.EXE", "TOOLX")]
    #[case::windows_dir(r"C:\Py\EGG-INFO\epd-toolx.exe", "toolx")]
    #[case::posix_dir("/py/EGG-INFO/epd-toolx.exe", "toolx")]
    #[case::prefix_only_once("epd-epd-toolx.exe", "epd-toolx")]
    fn proxy_stem_strips_known_prefix(#[case] source: &str, #[case] expected: &str) {
        let stem = proxy_stem(Utf8Path::new(source), &prefixes()).expect("valid source");
        assert_eq!(stem, expected);
    }

    #[rstest]
    #[case("toolx")]
    #[case("toolx.bat")]
    #[case(".exe")]
    #[case("epd-.exe")]
    #[case("exe")]
    fn proxy_stem_rejects_non_executables(#[case] source: &str) {
        let err = proxy_stem(Utf8Path::new(source), &prefixes()).expect_err("invalid source");
        assert!(matches!(err, LauncherError::InvalidProxySource { .. }));
    }

    #[test]
    fn proxy_stem_uses_configured_prefixes() {
        let custom = vec!["vendor-".to_owned()];
        let stem = proxy_stem(Utf8Path::new("vendor-epd-tool.exe"), &custom).expect("valid");
        assert_eq!(stem, "epd-tool");
    }

    #[test]
    fn proxy_script_forwards_arguments_and_exit_code() {
        let script = render_proxy_script(
            r#""C:\Py\python.exe""#,
            Utf8Path::new(r"C:\Py\EGG-INFO\epd-toolx.exe"),
        );

        assert_eq!(
            script,
            concat!(
                "#!\"C:\\Py\\python.exe\"\n",
                "# This proxy was created by shimsmith from a package with special instructions\n",
                "#\n",
                "import sys\n",
                "import subprocess\n",
                "\n",
                "src = 'C:\\\\Py\\\\EGG-INFO\\\\epd-toolx.exe'\n",
                "\n",
                "sys.exit(subprocess.call([src] + sys.argv[1:]))\n",
            )
        );
    }

    #[test]
    fn python_string_literal_escapes_quotes() {
        assert_eq!(python_string_literal("it's"), r"'it\'s'");
    }

    #[test]
    fn install_proxy_writes_stub_then_companion() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let bin_dir =
            Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir path not UTF-8");
        let ctx = LauncherContext::new(r"C:\Py\python.exe", bin_dir.clone())
            .with_platform(TargetPlatform::Windows);
        let mut stubs = MockBinaryWriter::new();
        stubs
            .expect_write_binary()
            .withf(|_, variant| *variant == LauncherVariant::Console)
            .times(1)
            .returning(|path, _| {
                fs::write(path, b"MZ")?;
                Ok(())
            });

        let written = ProxyInstaller::new(&ctx, &stubs)
            .install_proxy(Utf8Path::new(r"C:\Py\EGG-INFO\epd-toolx.exe"), &bin_dir)
            .expect("proxy install");

        assert_eq!(
            written,
            vec![bin_dir.join("toolx.exe"), bin_dir.join("toolx-script.py")]
        );
        let companion = fs::read_to_string(bin_dir.join("toolx-script.py")).expect("read");
        assert!(companion.contains("subprocess.call([src] + sys.argv[1:])"));
        assert!(companion.starts_with("#!\"C:\\Py\\python.exe\"\n"));
    }

    #[test]
    fn install_proxy_is_refused_for_posix_targets() {
        let ctx = LauncherContext::new("/usr/bin/python", "/usr/bin")
            .with_platform(TargetPlatform::Posix);
        let mut stubs = MockBinaryWriter::new();
        stubs.expect_write_binary().never();

        let err = ProxyInstaller::new(&ctx, &stubs)
            .install_proxy(Utf8Path::new("/opt/tool.exe"), Utf8Path::new("/usr/bin"))
            .expect_err("posix proxy");

        assert!(matches!(err, LauncherError::UnsupportedPlatform { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn companion_forwards_arguments_and_exit_status() {
        use std::os::unix::fs::PermissionsExt;
        use std::process::Command;

        if Command::new("python3").arg("--version").output().is_err() {
            return;
        }
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("temp dir not UTF-8");
        let target = dir.join("target tool");
        fs::write(&target, "#!/bin/sh\nfor arg in \"$@\"; do echo \"$arg\"; done\nexit 7\n")
            .expect("write target");
        fs::set_permissions(&target, fs::Permissions::from_mode(0o755)).expect("chmod");
        let companion = dir.join("tool-script.py");
        fs::write(&companion, render_proxy_script("python3", &target)).expect("write companion");

        let output = Command::new("python3")
            .arg(companion.as_std_path())
            .args(["a", "b"])
            .output()
            .expect("run companion");

        assert_eq!(String::from_utf8_lossy(&output.stdout), "a\nb\n");
        assert_eq!(output.status.code(), Some(7));
    }
}
