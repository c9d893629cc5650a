//! Entry-point declarations.
//!
//! A declaration has the form `module:callable`, e.g. `tool.cli:main`. The
//! module is imported lazily by the generated script when it is launched, so
//! this type only checks the shape of the declaration.

use crate::error::{LauncherError, Result};
use crate::variant::LauncherVariant;

/// A validated entry-point declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    name: String,
    module: String,
    callable: String,
    variant: LauncherVariant,
}

impl EntryPoint {
    /// Parse a `module:callable` declaration declared under `name`.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::InvalidEntryPoint`] unless the declaration
    /// contains exactly one `:` with a non-empty module and callable on either
    /// side.
    ///
    /// # Examples
    ///
    /// ```
    /// use shimsmith::entry_point::EntryPoint;
    /// use shimsmith::variant::LauncherVariant;
    ///
    /// let entry = EntryPoint::parse("tool", " tool.cli:main\n", LauncherVariant::Console)?;
    /// assert_eq!(entry.module(), "tool.cli");
    /// assert_eq!(entry.callable(), "main");
    /// # Ok::<(), shimsmith::error::LauncherError>(())
    /// ```
    pub fn parse(name: &str, declaration: &str, variant: LauncherVariant) -> Result<Self> {
        let invalid = |reason| LauncherError::InvalidEntryPoint {
            name: name.to_owned(),
            declaration: declaration.to_owned(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(invalid("entry point name is empty"));
        }

        let trimmed = declaration.trim();
        let (module, callable) = match trimmed.matches(':').count() {
            0 => return Err(invalid("missing `:` separator")),
            1 => trimmed.split_once(':').ok_or_else(|| invalid("missing `:` separator"))?,
            _ => return Err(invalid("more than one `:` separator")),
        };

        let module = module.trim();
        let callable = callable.trim();
        if module.is_empty() {
            return Err(invalid("module name is empty"));
        }
        if callable.is_empty() {
            return Err(invalid("callable name is empty"));
        }

        Ok(Self {
            name: name.trim().to_owned(),
            module: module.to_owned(),
            callable: callable.to_owned(),
            variant,
        })
    }

    /// The user-facing launcher name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The module the callable is imported from.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The callable invoked by the launcher.
    #[must_use]
    pub fn callable(&self) -> &str {
        &self.callable
    }

    /// Whether the launcher is a console or windowed program.
    #[must_use]
    pub const fn variant(&self) -> LauncherVariant {
        self.variant
    }
}
