//! Console and windowed launcher variants.

use crate::error::LauncherError;
use std::fmt;
use std::str::FromStr;

/// Selects the stub payload and the companion script suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LauncherVariant {
    /// A launcher attached to a console window.
    Console,
    /// A windowed launcher with no console.
    Gui,
}

impl LauncherVariant {
    /// Both variants, in the order the installer processes manifest sections.
    pub const ALL: [Self; 2] = [Self::Gui, Self::Console];

    /// The manifest section name declaring entry points of this variant.
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::Console => "console_scripts",
            Self::Gui => "gui_scripts",
        }
    }

    /// Extension of the companion script placed next to a Windows stub.
    #[must_use]
    pub const fn script_extension(self) -> &'static str {
        match self {
            Self::Console => "py",
            Self::Gui => "pyw",
        }
    }
}

impl FromStr for LauncherVariant {
    type Err = LauncherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "console_scripts" => Ok(Self::Console),
            "gui_scripts" => Ok(Self::Gui),
            other => Err(LauncherError::UnsupportedLauncherVariant {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for LauncherVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}
