//! Ownership propagation for root-run backups.

use std::fs;
use std::path::Path;

use crate::error::MetaError;

#[cfg(unix)]
mod raw_ids {
    #![allow(unsafe_code)]

    use rustix::fs::{Gid, Uid};
    use rustix::process::{RawGid, RawUid};

    pub(super) fn uid_from_raw(raw: RawUid) -> Uid {
        unsafe { Uid::from_raw(raw) }
    }

    pub(super) fn gid_from_raw(raw: RawGid) -> Gid {
        unsafe { Gid::from_raw(raw) }
    }
}

/// Copies owner and group from `metadata` onto `destination` when the
/// process runs as root; otherwise does nothing.
///
/// Pass `follow_symlinks = false` for symlink destinations to get `lchown`
/// semantics, so the link itself is re-owned rather than its target.
#[cfg(unix)]
pub fn chown_if_root(
    destination: &Path,
    metadata: &fs::Metadata,
    follow_symlinks: bool,
) -> Result<(), MetaError> {
    use std::io;
    use std::os::unix::fs::MetadataExt;

    use rustix::fs::{chownat, AtFlags, CWD};

    if rustix::process::geteuid().as_raw() != 0 {
        return Ok(());
    }

    let flags = if follow_symlinks {
        AtFlags::empty()
    } else {
        AtFlags::SYMLINK_NOFOLLOW
    };

    chownat(
        CWD,
        destination,
        Some(raw_ids::uid_from_raw(metadata.uid())),
        Some(raw_ids::gid_from_raw(metadata.gid())),
        flags,
    )
    .map_err(|error| MetaError::new("preserve ownership of", destination, io::Error::from(error)))
}

/// Ownership preservation is unavailable here; the call is a no-op.
#[cfg(not(unix))]
pub fn chown_if_root(
    _destination: &Path,
    _metadata: &fs::Metadata,
    _follow_symlinks: bool,
) -> Result<(), MetaError> {
    Ok(())
}
