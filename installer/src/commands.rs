//! Subcommand orchestration.
//!
//! Each command builds a [`LauncherContext`] from the shared target flags,
//! calls into the `shimsmith` library, appends whatever was written to the
//! record file and reports a one-line summary on stderr.

use crate::archive::DirectoryArchive;
use crate::cli::{Command, ProxyArgs, RepairArgs, ScriptsArgs, TargetArgs};
use crate::error::{InstallerError, Result};
use crate::manifest::EntryPointManifest;
use crate::output::{install_message, repair_message, write_stderr_line};
use crate::record::{append_record, read_record};
use camino::Utf8Path;
use log::debug;
use shimsmith::context::{LauncherContext, TargetPlatform};
use shimsmith::install::{
    InstalledFiles, PackageLayout, apply_instructions, create_entry_points, parse_instructions,
    repair_recorded,
};
use shimsmith::proxy::ProxyInstaller;
use shimsmith::stub::{LauncherBinaryWriter, StubPayloads};
use std::io::Write;

/// Run the chosen subcommand.
///
/// # Errors
///
/// Returns any error raised while reading inputs, writing launchers or
/// updating the record.
pub fn run(command: &Command, stderr: &mut dyn Write) -> Result<()> {
    match command {
        Command::Scripts(args) => run_scripts(args, stderr),
        Command::Proxy(args) => run_proxy(args, stderr),
        Command::Repair(args) => run_repair(args, stderr),
    }
}

/// Build the launcher context described by the target flags.
///
/// `fallback_label` names the package when `--package` was not given.
#[must_use]
pub fn build_context(target: &TargetArgs, fallback_label: Option<&str>) -> LauncherContext {
    let platform = if target.windows {
        TargetPlatform::Windows
    } else {
        TargetPlatform::host()
    };
    let mut ctx = LauncherContext::new(target.interpreter.clone(), target.bin_dir.clone())
        .with_platform(platform)
        .with_verbose(target.verbose);

    if let Some(label) = target.package.as_deref().or(fallback_label) {
        ctx = ctx.with_owner_label(label);
    }
    if !target.strip_prefixes.is_empty() {
        ctx = ctx.with_stripped_prefixes(target.strip_prefixes.iter().cloned());
    }
    if let Some(token) = &target.interpreter_token {
        ctx = ctx.with_interpreter_token(token.clone());
    }
    ctx
}

/// Load the stub payloads for `platform`.
///
/// An explicit `--stub-dir` wins, then payloads compiled in with the
/// `embedded-stubs` feature. POSIX targets never write stubs, so they fall
/// back to empty payloads.
///
/// # Errors
///
/// Returns [`InstallerError::MissingStubs`] for Windows targets with no stub
/// source, or the I/O error raised while reading `--stub-dir`.
pub fn load_stubs(target: &TargetArgs, platform: TargetPlatform) -> Result<StubPayloads> {
    if let Some(dir) = &target.stub_dir {
        return Ok(StubPayloads::from_dir(dir)?);
    }
    if let Some(payloads) = embedded_stubs() {
        return Ok(payloads);
    }
    if platform.is_windows() {
        return Err(InstallerError::MissingStubs);
    }
    Ok(StubPayloads::new(Vec::<u8>::new(), Vec::<u8>::new()))
}

#[cfg(feature = "embedded-stubs")]
fn embedded_stubs() -> Option<StubPayloads> {
    Some(StubPayloads::embedded())
}

#[cfg(not(feature = "embedded-stubs"))]
const fn embedded_stubs() -> Option<StubPayloads> {
    None
}

fn run_scripts(args: &ScriptsArgs, stderr: &mut dyn Write) -> Result<()> {
    let manifest = EntryPointManifest::load(&args.manifest)?;
    let table = manifest.to_table()?;
    let ctx = build_context(&args.target, manifest.package.as_deref());
    let writer = LauncherBinaryWriter::new(load_stubs(&args.target, ctx.platform())?);

    let mut record = InstalledFiles::new();
    let outcome = create_entry_points(&table, &ctx, &writer, &mut record);
    finish_install(outcome.map_err(Into::into), args.record.as_deref(), &record)?;

    report(&args.target, stderr, install_message(record.len(), ctx.bin_dir()));
    Ok(())
}

fn run_proxy(args: &ProxyArgs, stderr: &mut dyn Write) -> Result<()> {
    let ctx = build_context(&args.target, None);
    let writer = LauncherBinaryWriter::new(load_stubs(&args.target, ctx.platform())?);

    let mut record = InstalledFiles::new();
    let outcome = install_proxies(args, &ctx, &writer, &mut record);
    finish_install(outcome, args.record.as_deref(), &record)?;

    report(&args.target, stderr, install_message(record.len(), ctx.bin_dir()));
    Ok(())
}

fn install_proxies(
    args: &ProxyArgs,
    ctx: &LauncherContext,
    writer: &LauncherBinaryWriter,
    record: &mut InstalledFiles,
) -> Result<()> {
    if !args.sources.is_empty() {
        std::fs::create_dir_all(ctx.bin_dir()).map_err(shimsmith::LauncherError::from)?;
        let proxies = ProxyInstaller::new(ctx, writer);
        for source in &args.sources {
            record.extend(proxies.install_proxy(source, ctx.bin_dir())?);
        }
    }

    let Some(path) = &args.instructions else {
        return Ok(());
    };
    let (Some(archive_root), Some(prefix), Some(meta_dir)) =
        (&args.archive_root, &args.prefix, &args.meta_dir)
    else {
        // clap enforces these alongside --instructions.
        return Ok(());
    };

    let text = std::fs::read_to_string(path).map_err(|source| InstallerError::ReadFailed {
        path: path.clone(),
        source,
    })?;
    let instructions = parse_instructions(&text)?;
    let layout = PackageLayout {
        prefix: prefix.clone(),
        meta_dir: meta_dir.clone(),
    };
    let archive = DirectoryArchive::new(archive_root.clone());
    apply_instructions(&instructions, &layout, &archive, ctx, writer, record)?;
    Ok(())
}

fn run_repair(args: &RepairArgs, stderr: &mut dyn Write) -> Result<()> {
    let ctx = build_context(&args.target, None);

    let mut paths = args.paths.clone();
    if let Some(record) = &args.record {
        paths.extend(read_record(record)?);
    }
    debug!("run_repair: {} candidate path(s)", paths.len());

    let summary = repair_recorded(&paths, &ctx)?;
    report(&args.target, stderr, repair_message(&summary));
    Ok(())
}

/// Append what was written to the record, even when the install failed part
/// way, then surface the install outcome.
fn finish_install(
    outcome: Result<()>,
    record_path: Option<&Utf8Path>,
    record: &InstalledFiles,
) -> Result<()> {
    if let Some(path) = record_path {
        append_record(path, record.paths())?;
    }
    outcome
}

fn report(target: &TargetArgs, stderr: &mut dyn Write, message: String) {
    if !target.quiet {
        write_stderr_line(stderr, message);
    }
}
