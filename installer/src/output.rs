//! Output formatting for the shimsmith CLI.
//!
//! User-facing progress goes to stderr through [`write_stderr_line`]. The
//! library reports per-file progress through the `log` facade;
//! [`init_logging`] installs a `tracing-subscriber` formatter that picks
//! those records up through its `log` bridge and writes them to stderr.

use camino::Utf8Path;
use shimsmith::install::RepairSummary;
use std::io::Write;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Write `message` and a newline to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format the message shown after launchers are installed.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use shimsmith_installer::output::install_message;
///
/// let message = install_message(1, Utf8Path::new("/opt/py/bin"));
/// assert_eq!(message, "Installed 1 file into /opt/py/bin");
/// ```
#[must_use]
pub fn install_message(count: usize, bin_dir: &Utf8Path) -> String {
    let plural = if count == 1 { "file" } else { "files" };
    format!("Installed {count} {plural} into {bin_dir}")
}

/// Format the message shown after a repair pass.
#[must_use]
pub fn repair_message(summary: &RepairSummary) -> String {
    format!(
        "Repaired {} script(s); {} already current, {} skipped",
        summary.rewritten, summary.unchanged, summary.skipped
    )
}

/// Route `log` records to stderr: progress at `info` when `verbose`,
/// otherwise warnings and errors only.
///
/// Only the first call installs a subscriber; later calls are ignored.
pub fn init_logging(verbose: bool) {
    if subscriber(verbose, std::io::stderr).try_init().is_err() {
        // A global subscriber is already installed (for example by a test harness).
    }
}

fn subscriber<W>(verbose: bool, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_max_level(level_for(verbose))
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .finish()
}

const fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}
