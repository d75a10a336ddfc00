//! Per-entry classification against the prior snapshot.

use std::fs;
use std::path::Path;

use filetime::FileTime;
use pdumpfs_meta::{file_kind, FileKind};

/// Materialization decision for one source entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification {
    /// Source entry is a directory; mirror it and descend.
    Directory,
    /// Regular file identical (size + mtime) to the prior snapshot's; reuse
    /// its inode with a hard link.
    Unchanged,
    /// Regular file that differs from the prior snapshot's; copy it.
    Updated,
    /// Regular file with no usable prior counterpart; copy it.
    NewFile,
    /// Symbolic link; recreate it with the same target text.
    Symlink,
    /// Device, socket, FIFO, or other special file; skipped.
    Unsupported,
}

impl Classification {
    /// Returns the tag reported for this classification.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Unchanged => "unchanged",
            Self::Updated => "updated",
            Self::NewFile => "new_file",
            Self::Symlink => "symlink",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Decides how a source entry is materialized.
///
/// `source_metadata` is the entry's `lstat` data; `prior` is the path of the
/// counterpart in the most recent prior snapshot, when one exists. Hard-link
/// reuse is considered only when the prior counterpart is a *real* regular
/// file; a symlink or directory there forces a fresh copy, so a type change
/// in the source never links the new snapshot to an incompatible object.
#[must_use]
pub fn classify(source_metadata: &fs::Metadata, prior: Option<&Path>) -> Classification {
    if source_metadata.is_dir() {
        return Classification::Directory;
    }

    let prior_regular = prior
        .and_then(|path| fs::symlink_metadata(path).ok())
        .filter(fs::Metadata::is_file);

    match (file_kind(source_metadata), prior_regular) {
        (FileKind::File, Some(prior_metadata)) => {
            if same_file(source_metadata, &prior_metadata) {
                Classification::Unchanged
            } else {
                Classification::Updated
            }
        }
        (FileKind::File, None) => Classification::NewFile,
        (FileKind::Symlink, _) => Classification::Symlink,
        _ => Classification::Unsupported,
    }
}

/// The identity check governing hard-link reuse: both entries are real
/// regular files with equal size and equal mtime at the resolution the
/// filesystem exposes. Contents are never compared.
#[must_use]
pub fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    a.is_file()
        && b.is_file()
        && a.len() == b.len()
        && FileTime::from_last_modification_time(a) == FileTime::from_last_modification_time(b)
}
