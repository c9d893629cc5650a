//! Entry-point manifest loading.
//!
//! A package's entry points are described in a TOML file:
//!
//! ```toml
//! package = "tool-1.0-1.egg"
//!
//! [console_scripts]
//! tool = "tool.cli:main"
//!
//! [gui_scripts]
//! tool-gui = "tool.gui:run"
//! ```
//!
//! The tables map launcher names to `module:callable` declarations.

use crate::error::{InstallerError, Result};
use camino::Utf8Path;
use serde::Deserialize;
use shimsmith::install::EntryPointTable;
use shimsmith::variant::LauncherVariant;
use std::collections::BTreeMap;

/// Parsed contents of an entry-point manifest.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EntryPointManifest {
    /// Label naming the package in generated script comments.
    pub package: Option<String>,
    /// Console launchers, by name.
    pub console_scripts: BTreeMap<String, String>,
    /// Windowed launchers, by name.
    pub gui_scripts: BTreeMap<String, String>,
}

impl EntryPointManifest {
    /// Read and parse the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ReadFailed`] if the file cannot be read and
    /// [`InstallerError::ManifestParse`] if it is not a valid manifest.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| InstallerError::ReadFailed {
                path: path.to_owned(),
                source,
            })?;
        Self::parse(&contents, path)
    }

    /// Parse manifest text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ManifestParse`] on invalid TOML or unknown
    /// keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use shimsmith_installer::manifest::EntryPointManifest;
    ///
    /// let manifest = EntryPointManifest::parse(
    ///     "[console_scripts]\ntool = \"tool.cli:main\"\n",
    ///     Utf8Path::new("entry_points.toml"),
    /// )?;
    /// assert_eq!(manifest.console_scripts.len(), 1);
    /// # Ok::<(), shimsmith_installer::error::InstallerError>(())
    /// ```
    pub fn parse(contents: &str, path: &Utf8Path) -> Result<Self> {
        toml::from_str(contents).map_err(|e| InstallerError::ManifestParse {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Validate every declaration and group them for installation.
    ///
    /// # Errors
    ///
    /// Returns the first malformed declaration as a launcher error.
    pub fn to_table(&self) -> Result<EntryPointTable> {
        let mut table = EntryPointTable::new();
        table.add_section(LauncherVariant::Gui.section_name(), &self.gui_scripts)?;
        table.add_section(LauncherVariant::Console.section_name(), &self.console_scripts)?;
        Ok(table)
    }
}
