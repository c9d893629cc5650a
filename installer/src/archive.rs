//! Archive access backed by an unpacked package directory.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use shimsmith::install::ArchiveReader;
use std::io;

/// Reads archive members from a directory the package was unpacked into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryArchive {
    root: Utf8PathBuf,
}

impl DirectoryArchive {
    /// Serve members from beneath `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory members are read from.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

impl ArchiveReader for DirectoryArchive {
    fn read_member(&self, archive_path: &str) -> io::Result<Vec<u8>> {
        let member = Utf8Path::new(archive_path);
        if member
            .components()
            .any(|c| !matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("archive member escapes the archive root: {archive_path}"),
            ));
        }
        std::fs::read(self.root.join(member))
    }
}
