//! Per-install launcher configuration.
//!
//! [`LauncherContext`] carries everything the writers and the repairer need
//! to know about an install: the interpreter to embed, the target platform,
//! the binary directory and the owning package. It is built once by the
//! installer and passed by reference into every operation.

use camino::{Utf8Path, Utf8PathBuf};

/// Proxy name prefixes stripped by default.
pub const DEFAULT_STRIPPED_PREFIXES: &[&str] = &["epd-"];

/// Substring identifying interpreter directives the repairer may rewrite.
pub const DEFAULT_INTERPRETER_TOKEN: &str = "python";

/// The platform launchers are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPlatform {
    /// Unix-like targets that honour `#!` directives.
    Posix,
    /// Windows targets that need a binary stub per launcher.
    Windows,
}

impl TargetPlatform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Select a platform from a Windows flag.
    #[must_use]
    pub const fn from_windows_flag(is_windows: bool) -> Self {
        if is_windows {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Returns true for Windows targets.
    #[must_use]
    pub const fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }
}

/// Immutable configuration shared by every launcher operation of one install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherContext {
    interpreter: Utf8PathBuf,
    platform: TargetPlatform,
    bin_dir: Utf8PathBuf,
    owner_label: String,
    verbose: bool,
    stripped_prefixes: Vec<String>,
    interpreter_token: String,
}

impl LauncherContext {
    /// Create a context for the host platform with default naming rules.
    ///
    /// # Examples
    ///
    /// ```
    /// use shimsmith::context::{LauncherContext, TargetPlatform};
    ///
    /// let ctx = LauncherContext::new("/opt/py/bin/python", "/opt/py/bin")
    ///     .with_platform(TargetPlatform::Posix)
    ///     .with_owner_label("tool-1.0.egg");
    ///
    /// assert_eq!(ctx.interpreter_invocation(), "/opt/py/bin/python");
    /// ```
    #[must_use]
    pub fn new(interpreter: impl Into<Utf8PathBuf>, bin_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            platform: TargetPlatform::host(),
            bin_dir: bin_dir.into(),
            owner_label: String::new(),
            verbose: false,
            stripped_prefixes: DEFAULT_STRIPPED_PREFIXES
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
            interpreter_token: DEFAULT_INTERPRETER_TOKEN.to_owned(),
        }
    }

    /// Override the target platform.
    #[must_use]
    pub fn with_platform(mut self, platform: TargetPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the label naming the package in generated script comments.
    #[must_use]
    pub fn with_owner_label(mut self, label: impl Into<String>) -> Self {
        self.owner_label = label.into();
        self
    }

    /// Enable per-file progress logging.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replace the set of prefixes stripped from proxy destination names.
    #[must_use]
    pub fn with_stripped_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stripped_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the substring that marks a directive as an interpreter line.
    #[must_use]
    pub fn with_interpreter_token(mut self, token: impl Into<String>) -> Self {
        self.interpreter_token = token.into();
        self
    }

    /// The interpreter embedded in generated scripts.
    #[must_use]
    pub fn interpreter(&self) -> &Utf8Path {
        &self.interpreter
    }

    /// The target platform.
    #[must_use]
    pub const fn platform(&self) -> TargetPlatform {
        self.platform
    }

    /// The directory launchers are installed into.
    #[must_use]
    pub fn bin_dir(&self) -> &Utf8Path {
        &self.bin_dir
    }

    /// The package label written into script comments.
    #[must_use]
    pub fn owner_label(&self) -> &str {
        &self.owner_label
    }

    /// Whether per-file progress is logged.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Prefixes stripped from proxy destination names.
    #[must_use]
    pub fn stripped_prefixes(&self) -> &[String] {
        &self.stripped_prefixes
    }

    /// Lowercase substring that identifies interpreter directives.
    #[must_use]
    pub fn interpreter_token(&self) -> &str {
        &self.interpreter_token
    }

    /// The interpreter as it appears after `#!` in generated scripts.
    ///
    /// Windows paths are always quoted; elsewhere the path is quoted only
    /// when it contains a space.
    #[must_use]
    pub fn interpreter_invocation(&self) -> String {
        quote_interpreter(self.interpreter.as_str(), self.platform)
    }
}

/// Quote an interpreter path for a `#!` directive on `platform`.
pub(crate) fn quote_interpreter(interpreter: &str, platform: TargetPlatform) -> String {
    if platform.is_windows() || interpreter.contains(' ') {
        format!("\"{interpreter}\"")
    } else {
        interpreter.to_owned()
    }
}
