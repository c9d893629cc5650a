//! Launcher generation and repair for installed package entry points.
//!
//! After a package is unpacked, each entry point it declares needs something
//! the operating system can run from a shell. On POSIX targets that is a
//! `#!` script; on Windows it is a binary stub that runs a companion script.
//! This crate writes those launchers, installs proxies for prebuilt Windows
//! executables, and repairs interpreter directives after an install has
//! moved.
//!
//! # Modules
//!
//! - [`context`] - Per-install configuration passed to every operation
//! - [`entry_point`] - `module:callable` declarations
//! - [`error`] - Semantic error types
//! - [`fs`] - Removal, permission and in-use helpers
//! - [`install`] - Package-level orchestration and the installed-file record
//! - [`launcher`] - POSIX and Windows launcher layouts
//! - [`proxy`] - Proxy launchers for prebuilt executables
//! - [`repair`] - Interpreter directive repair
//! - [`script`] - Entry-point script generation
//! - [`stub`] - Windows stub payloads and the binary writer
//! - [`variant`] - Console and windowed launcher variants

pub mod context;
pub mod entry_point;
pub mod error;
pub mod fs;
pub mod install;
pub mod launcher;
pub mod proxy;
pub mod repair;
pub mod script;
pub mod stub;
pub mod variant;

pub use context::{LauncherContext, TargetPlatform};
pub use entry_point::EntryPoint;
pub use error::{LauncherError, Result};
pub use repair::{LauncherRepairer, RepairOutcome};
pub use variant::LauncherVariant;
