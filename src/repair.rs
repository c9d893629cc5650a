//! Interpreter directive repair for installed scripts.
//!
//! When an install is relocated the `#!` lines of scripts shipped inside a
//! package still name the old interpreter. [`LauncherRepairer::repair`]
//! rewrites that first line to the current interpreter and leaves the rest of
//! the file byte-for-byte intact. Scripts generated by this crate are never
//! touched; neither are symlinks, binaries or anything else it does not
//! recognise.

use crate::context::LauncherContext;
use crate::error::Result;
use crate::fs::make_executable;
use crate::script::GENERATOR_MARKER;
use camino::Utf8Path;
use log::{info, trace};
use std::fs;

/// What [`LauncherRepairer::repair`] did with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The file is not a script this pass manages.
    Skipped,
    /// The directive already names the current interpreter.
    Unchanged,
    /// The directive was replaced.
    Rewritten,
}

/// Rewrites stale interpreter directives.
#[derive(Debug, Clone, Copy)]
pub struct LauncherRepairer<'a> {
    ctx: &'a LauncherContext,
}

impl<'a> LauncherRepairer<'a> {
    /// Create a repairer targeting `ctx`'s interpreter.
    #[must_use]
    pub const fn new(ctx: &'a LauncherContext) -> Self {
        Self { ctx }
    }

    /// Repair the interpreter directive of the file at `path`.
    ///
    /// Running this twice on the same file yields [`RepairOutcome::Rewritten`]
    /// at most once.
    ///
    /// # Errors
    ///
    /// Unreadable and unrecognised files are reported as
    /// [`RepairOutcome::Skipped`]. An error is returned only when a file that
    /// needs rewriting cannot be written or made executable.
    pub fn repair(&self, path: &Utf8Path) -> Result<RepairOutcome> {
        let Some(data) = read_regular_text(path) else {
            return Ok(RepairOutcome::Skipped);
        };

        if data.contains(GENERATOR_MARKER) {
            trace!("repair: {path} was generated by this tool, skipping");
            return Ok(RepairOutcome::Skipped);
        }

        let (first_line, rest) = split_first_line(&data);
        let interpreter_name = base_name(self.ctx.interpreter().as_str());
        if !is_interpreter_directive(
            first_line,
            &[self.ctx.interpreter_token(), interpreter_name],
        ) {
            trace!("repair: {path} has no interpreter directive, skipping");
            return Ok(RepairOutcome::Skipped);
        }

        let directive = self.directive();
        if directive == first_line {
            return Ok(RepairOutcome::Unchanged);
        }

        if self.ctx.verbose() {
            info!("Updating: {path}");
        }
        let mut repaired = String::with_capacity(directive.len() + rest.len());
        repaired.push_str(&directive);
        repaired.push_str(rest);
        fs::write(path, repaired)?;
        make_executable(path)?;
        Ok(RepairOutcome::Rewritten)
    }

    /// The directive the first line should carry.
    ///
    /// Only Windows directives are quoted; POSIX kernels pass quotes through
    /// to `execve` verbatim.
    fn directive(&self) -> String {
        let interpreter = self.ctx.interpreter();
        if self.ctx.platform().is_windows() {
            format!("#!\"{interpreter}\"")
        } else {
            format!("#!{interpreter}")
        }
    }
}

/// Read `path` as UTF-8 text if it is a regular file and not a symlink.
fn read_regular_text(path: &Utf8Path) -> Option<String> {
    let metadata = fs::symlink_metadata(path).ok()?;
    if !metadata.file_type().is_file() {
        trace!("repair: {path} is not a regular file, skipping");
        return None;
    }
    match fs::read(path).map(String::from_utf8) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(_)) => {
            trace!("repair: {path} is not UTF-8 text, skipping");
            None
        }
        Err(e) => {
            trace!("repair: failed to read {path}: {e}");
            None
        }
    }
}

/// Split `data` into its first line (without terminator) and the remainder
/// (starting with the terminator, if any).
fn split_first_line(data: &str) -> (&str, &str) {
    let end = data.find('\n').unwrap_or(data.len());
    let line_end = if data.get(..end).is_some_and(|line| line.ends_with('\r')) {
        end.saturating_sub(1)
    } else {
        end
    };
    data.split_at(line_end)
}

/// Final path component of `path`, splitting on both `/` and `\\`.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// A `#!` followed by at least one character and mentioning any non-empty
/// entry of `tokens` case-insensitively.
fn is_interpreter_directive(line: &str, tokens: &[&str]) -> bool {
    line.strip_prefix("#!").is_some_and(|target| {
        let target = target.to_lowercase();
        !target.is_empty()
            && tokens
                .iter()
                .filter(|token| !token.is_empty())
                .any(|token| target.contains(&token.to_lowercase()))
    })
}
