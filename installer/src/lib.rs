//! shimsmith command-line front end.
//!
//! This crate wires the `shimsmith` launcher library to the filesystem inputs
//! an installer works with: an entry-point manifest, a `files_to_install`
//! instruction list, an unpacked archive directory and the installed-file
//! record. It is used by the `shimsmith` binary and can be driven
//! programmatically in tests.
//!
//! # Modules
//!
//! - [`archive`] - Archive members read from an unpacked directory
//! - [`cli`] - Command-line argument definitions
//! - [`commands`] - Subcommand orchestration
//! - [`error`] - Semantic error types
//! - [`manifest`] - TOML entry-point manifests
//! - [`output`] - Progress messages and the stderr logger
//! - [`record`] - The installed-file record

pub mod archive;
pub mod cli;
pub mod commands;
pub mod error;
pub mod manifest;
pub mod output;
pub mod record;
