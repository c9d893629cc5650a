//! Package-level launcher installation.
//!
//! These functions drive the single-file writers over everything one package
//! declares: its entry-point sections, its `files_to_install` instructions
//! and, later, the repair of what was recorded. Every created path is
//! appended to an [`InstalledFiles`] record owned by the caller.

use crate::context::LauncherContext;
use crate::entry_point::EntryPoint;
use crate::error::{LauncherError, Result};
use crate::fs::remove_if_exists;
use crate::proxy::ProxyInstaller;
use crate::repair::{LauncherRepairer, RepairOutcome};
use crate::script::ScriptWriter;
use crate::stub::BinaryWriter;
use crate::variant::LauncherVariant;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info};
use std::fs;
use std::str::FromStr;

/// Archive paths under this prefix resolve against the metadata directory.
pub const METADATA_ARCHIVE_PREFIX: &str = "EGG-INFO/";

/// Action keyword requesting a proxy launcher.
pub const PROXY_ACTION: &str = "PROXY";

/// Ordered, append-only record of files created during an install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledFiles {
    paths: Vec<Utf8PathBuf>,
}

impl InstalledFiles {
    /// Create an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self { paths: Vec::new() }
    }

    /// Append one path.
    pub fn push(&mut self, path: Utf8PathBuf) {
        self.paths.push(path);
    }

    /// The recorded paths in creation order.
    #[must_use]
    pub fn paths(&self) -> &[Utf8PathBuf] {
        &self.paths
    }

    /// Number of recorded paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Consume the record and return the paths.
    #[must_use]
    pub fn into_paths(self) -> Vec<Utf8PathBuf> {
        self.paths
    }
}

impl Extend<Utf8PathBuf> for InstalledFiles {
    fn extend<T: IntoIterator<Item = Utf8PathBuf>>(&mut self, iter: T) {
        self.paths.extend(iter);
    }
}

impl From<Vec<Utf8PathBuf>> for InstalledFiles {
    fn from(paths: Vec<Utf8PathBuf>) -> Self {
        Self { paths }
    }
}

/// Entry points declared by a package, grouped by variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPointTable {
    gui: Vec<EntryPoint>,
    console: Vec<EntryPoint>,
}

impl EntryPointTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            gui: Vec::new(),
            console: Vec::new(),
        }
    }

    /// Add every `name = declaration` pair of the section called `section`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::UnsupportedLauncherVariant`] for unknown
    /// section names and [`LauncherError::InvalidEntryPoint`] for malformed
    /// declarations.
    pub fn add_section<I, K, V>(&mut self, section: &str, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let variant = LauncherVariant::from_str(section)?;
        for (name, declaration) in entries {
            self.insert(EntryPoint::parse(
                name.as_ref(),
                declaration.as_ref(),
                variant,
            )?);
        }
        Ok(())
    }

    /// Add a single parsed entry point.
    pub fn insert(&mut self, entry_point: EntryPoint) {
        match entry_point.variant() {
            LauncherVariant::Gui => self.gui.push(entry_point),
            LauncherVariant::Console => self.console.push(entry_point),
        }
    }

    /// Entry points in installation order: windowed first, then console.
    pub fn iter(&self) -> impl Iterator<Item = &EntryPoint> {
        self.gui.iter().chain(self.console.iter())
    }

    /// Returns true when no entry points are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gui.is_empty() && self.console.is_empty()
    }
}

/// Write a launcher for every entry point in `table` into the context's
/// binary directory, creating the directory if needed.
///
/// # Errors
///
/// Returns the first error raised while creating the directory or writing a
/// launcher. Paths written before the failure remain in `record`.
pub fn create_entry_points(
    table: &EntryPointTable,
    ctx: &LauncherContext,
    binary_writer: &dyn BinaryWriter,
    record: &mut InstalledFiles,
) -> Result<()> {
    fs::create_dir_all(ctx.bin_dir())?;
    let writer = ScriptWriter::new(ctx, binary_writer);

    for entry_point in table.iter() {
        let destination = ctx.bin_dir().join(entry_point.name());
        let written = writer.write_entry_point_script(&destination, entry_point)?;
        record.extend(written);
    }
    Ok(())
}

/// What to do with one archive member listed in `files_to_install`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallAction {
    /// Install a proxy launcher for the member.
    Proxy,
    /// Copy the member into this directory, relative to the install prefix.
    CopyTo(Utf8PathBuf),
}

/// One `files_to_install` line: an archive path and its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyInstruction {
    /// Path of the member inside the package archive.
    pub archive_path: String,
    /// The requested action.
    pub action: InstallAction,
}

impl FromStr for ProxyInstruction {
    type Err = LauncherError;

    fn from_str(line: &str) -> Result<Self> {
        let mut fields = line.split_whitespace();
        let (Some(archive_path), Some(action), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(LauncherError::InvalidInstruction {
                line: line.to_owned(),
            });
        };

        let action = if action == PROXY_ACTION {
            InstallAction::Proxy
        } else {
            InstallAction::CopyTo(Utf8PathBuf::from(action))
        };
        Ok(Self {
            archive_path: archive_path.to_owned(),
            action,
        })
    }
}

/// Parse the contents of a `files_to_install` manifest.
///
/// Blank lines and lines starting with `#` are ignored.
///
/// # Errors
///
/// Returns [`LauncherError::InvalidInstruction`] for the first line that does
/// not have exactly two fields.
pub fn parse_instructions(text: &str) -> Result<Vec<ProxyInstruction>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ProxyInstruction::from_str)
        .collect()
}

/// Where an unpacked package lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    /// The install prefix archive members are relative to.
    pub prefix: Utf8PathBuf,
    /// The directory holding the package metadata.
    pub meta_dir: Utf8PathBuf,
}

impl PackageLayout {
    /// The on-disk path of the archive member `archive_path`.
    #[must_use]
    pub fn resolve(&self, archive_path: &str) -> Utf8PathBuf {
        archive_path.strip_prefix(METADATA_ARCHIVE_PREFIX).map_or_else(
            || self.prefix.join(archive_path),
            |rest| self.meta_dir.join(rest),
        )
    }
}

/// Read access to the members of a package archive.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveReader {
    /// Return the bytes of the member at `archive_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the member is missing or unreadable.
    fn read_member(&self, archive_path: &str) -> std::io::Result<Vec<u8>>;
}

/// Carry out `instructions`: install proxies into the context's binary
/// directory and copy other members into their target directories.
///
/// # Errors
///
/// Returns the first error raised by a proxy install, an archive read or a
/// copy, and [`LauncherError::InvalidInstruction`] for a copy whose member
/// path names no file. Paths written before the failure remain in `record`.
pub fn apply_instructions(
    instructions: &[ProxyInstruction],
    layout: &PackageLayout,
    archive: &dyn ArchiveReader,
    ctx: &LauncherContext,
    binary_writer: &dyn BinaryWriter,
    record: &mut InstalledFiles,
) -> Result<()> {
    fs::create_dir_all(ctx.bin_dir())?;
    let proxies = ProxyInstaller::new(ctx, binary_writer);

    for instruction in instructions {
        debug!(
            "apply_instructions: {} -> {:?}",
            instruction.archive_path, instruction.action
        );
        match &instruction.action {
            InstallAction::Proxy => {
                let source = layout.resolve(&instruction.archive_path);
                record.extend(proxies.install_proxy(&source, ctx.bin_dir())?);
            }
            InstallAction::CopyTo(dir) => {
                let destination = copy_member(archive, layout, &instruction.archive_path, dir)?;
                if ctx.verbose() {
                    info!("Copied {} to {destination}", instruction.archive_path);
                }
                record.push(destination);
            }
        }
    }
    Ok(())
}

fn copy_member(
    archive: &dyn ArchiveReader,
    layout: &PackageLayout,
    archive_path: &str,
    dir: &Utf8Path,
) -> Result<Utf8PathBuf> {
    let file_name = archive_path.rsplit('/').next().unwrap_or(archive_path);
    if matches!(file_name, "" | "." | "..") {
        return Err(LauncherError::InvalidInstruction {
            line: format!("{archive_path} {dir}"),
        });
    }
    let data = archive.read_member(archive_path)?;
    let target_dir = layout.prefix.join(dir);
    let destination = target_dir.join(file_name);

    fs::create_dir_all(&target_dir)?;
    remove_if_exists(&destination)?;
    fs::write(&destination, data)?;
    Ok(destination)
}

/// Tally of a repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Files left alone.
    pub skipped: usize,
    /// Scripts already naming the current interpreter.
    pub unchanged: usize,
    /// Scripts whose directive was rewritten.
    pub rewritten: usize,
}

impl RepairSummary {
    fn record(&mut self, outcome: RepairOutcome) {
        match outcome {
            RepairOutcome::Skipped => self.skipped += 1,
            RepairOutcome::Unchanged => self.unchanged += 1,
            RepairOutcome::Rewritten => self.rewritten += 1,
        }
    }
}

/// Repair every recorded path that lies inside the context's binary
/// directory. Paths elsewhere are not examined.
///
/// # Errors
///
/// Returns the first error raised while rewriting a script.
pub fn repair_recorded(paths: &[Utf8PathBuf], ctx: &LauncherContext) -> Result<RepairSummary> {
    let repairer = LauncherRepairer::new(ctx);
    let mut summary = RepairSummary::default();

    for path in paths.iter().filter(|p| p.starts_with(ctx.bin_dir())) {
        summary.record(repairer.repair(path)?);
    }
    Ok(summary)
}
