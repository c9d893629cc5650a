//! CLI argument definitions for shimsmith.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{ArgGroup, Args, Parser, Subcommand};

/// Install and repair launchers for a package's entry points.
#[derive(Parser, Debug)]
#[command(name = "shimsmith")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install and repair launchers for a package's entry points.\n\n",
    "On POSIX targets each launcher is a script with a #! directive naming the ",
    "interpreter. On Windows targets each launcher is a stub executable that ",
    "runs a companion -script.py or -script.pyw file.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install launchers declared in a manifest:\n",
    "    $ shimsmith scripts --manifest entry_points.toml \\\n",
    "        --bin-dir /opt/py/bin --interpreter /opt/py/bin/python\n\n",
    "  Install a proxy for a bundled Windows executable:\n",
    "    $ shimsmith proxy --windows --stub-dir stubs \\\n",
    "        --bin-dir C:\\Py\\Scripts --interpreter C:\\Py\\python.exe \\\n",
    "        C:\\Py\\EGG-INFO\\tool\\usr\\bin\\epd-tool.exe\n\n",
    "  Repair directives after moving an install:\n",
    "    $ shimsmith repair --record files.txt \\\n",
    "        --bin-dir /new/bin --interpreter /new/bin/python",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install launchers for the entry points in a manifest.
    Scripts(ScriptsArgs),

    /// Install proxy launchers for prebuilt executables.
    Proxy(ProxyArgs),

    /// Rewrite stale interpreter directives in installed scripts.
    Repair(RepairArgs),
}

/// Settings shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Directory launchers are written into.
    #[arg(long, value_name = "DIR")]
    pub bin_dir: Utf8PathBuf,

    /// Interpreter named in generated launchers.
    #[arg(long, value_name = "PATH")]
    pub interpreter: Utf8PathBuf,

    /// Generate Windows launchers regardless of the host platform.
    #[arg(long)]
    pub windows: bool,

    /// Label naming the package in generated script comments.
    #[arg(long, value_name = "LABEL")]
    pub package: Option<String>,

    /// Prefix removed from proxy launcher names (repeatable) [default: epd-].
    #[arg(long = "strip-prefix", value_name = "PREFIX")]
    pub strip_prefixes: Vec<String>,

    /// Substring that marks a `#!` line as an interpreter directive
    /// [default: python].
    #[arg(long, value_name = "TOKEN")]
    pub interpreter_token: Option<String>,

    /// Directory holding the `cli.exe` and `gui.exe` stub executables.
    #[arg(long, value_name = "DIR")]
    pub stub_dir: Option<Utf8PathBuf>,

    /// Report every file written or updated.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Arguments for the `scripts` command.
#[derive(Args, Debug, Clone)]
pub struct ScriptsArgs {
    /// TOML manifest declaring `console_scripts` and `gui_scripts`.
    #[arg(long, value_name = "FILE")]
    pub manifest: Utf8PathBuf,

    /// Append every created path to this record file.
    #[arg(long, value_name = "FILE")]
    pub record: Option<Utf8PathBuf>,

    /// Target settings.
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the `proxy` command.
#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .multiple(true)
        .args(["sources", "instructions"])
))]
pub struct ProxyArgs {
    /// Executables to install proxies for.
    #[arg(value_name = "EXE")]
    pub sources: Vec<Utf8PathBuf>,

    /// `files_to_install` listing proxy and copy instructions.
    #[arg(long, value_name = "FILE", requires_all = ["archive_root", "prefix", "meta_dir"])]
    pub instructions: Option<Utf8PathBuf>,

    /// Directory the package archive was unpacked into.
    #[arg(long, value_name = "DIR")]
    pub archive_root: Option<Utf8PathBuf>,

    /// Install prefix that copy instructions are relative to.
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<Utf8PathBuf>,

    /// Directory `EGG-INFO/` members resolve against.
    #[arg(long, value_name = "DIR")]
    pub meta_dir: Option<Utf8PathBuf>,

    /// Append every created path to this record file.
    #[arg(long, value_name = "FILE")]
    pub record: Option<Utf8PathBuf>,

    /// Target settings.
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the `repair` command.
#[derive(Args, Debug, Clone)]
#[command(group(
    ArgGroup::new("input")
        .required(true)
        .multiple(true)
        .args(["paths", "record"])
))]
pub struct RepairArgs {
    /// Scripts to repair; only paths inside `--bin-dir` are examined.
    #[arg(value_name = "PATH")]
    pub paths: Vec<Utf8PathBuf>,

    /// Record file listing installed paths to repair.
    #[arg(long, value_name = "FILE")]
    pub record: Option<Utf8PathBuf>,

    /// Target settings.
    #[command(flatten)]
    pub target: TargetArgs,
}

impl Command {
    /// The target settings of whichever subcommand was chosen.
    #[must_use]
    pub const fn target(&self) -> &TargetArgs {
        match self {
            Self::Scripts(args) => &args.target,
            Self::Proxy(args) => &args.target,
            Self::Repair(args) => &args.target,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
