//! Destination filesystem capability probing.

use std::path::Path;

use crate::error::MetaError;

/// Opaque identifier of the filesystem holding a path.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FilesystemId(u64);

impl FilesystemId {
    /// Returns the raw identifier reported by the host.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Identifies the filesystem holding `path`.
#[cfg(target_os = "linux")]
pub fn filesystem_id(path: &Path) -> Result<FilesystemId, MetaError> {
    use std::io;

    let stat = rustix::fs::statfs(path)
        .map_err(|error| MetaError::new("identify filesystem of", path, io::Error::from(error)))?;
    Ok(FilesystemId(stat.f_type as u64))
}

/// Identifies the filesystem holding `path` by its device number.
#[cfg(all(unix, not(target_os = "linux")))]
pub fn filesystem_id(path: &Path) -> Result<FilesystemId, MetaError> {
    use std::os::unix::fs::MetadataExt;

    let metadata = std::fs::metadata(path)
        .map_err(|error| MetaError::new("identify filesystem of", path, error))?;
    Ok(FilesystemId(metadata.dev()))
}

/// Filesystem identification is unavailable on this platform.
#[cfg(not(unix))]
pub fn filesystem_id(path: &Path) -> Result<FilesystemId, MetaError> {
    use std::io;

    Err(MetaError::new(
        "identify filesystem of",
        path,
        io::Error::new(
            io::ErrorKind::Unsupported,
            "filesystem identification is not supported on this platform",
        ),
    ))
}

/// Verifies the destination filesystem can hold hard links.
///
/// POSIX filesystems always can. Elsewhere the probe refuses the
/// destination, since a snapshot store without hard links would silently
/// degrade every run into a full copy.
#[cfg(unix)]
pub fn ensure_hard_link_capable(_path: &Path) -> Result<(), MetaError> {
    Ok(())
}

/// Verifies the destination filesystem can hold hard links.
#[cfg(not(unix))]
pub fn ensure_hard_link_capable(path: &Path) -> Result<(), MetaError> {
    use std::io;

    Err(MetaError::new(
        "verify hard-link support of",
        path,
        io::Error::new(
            io::ErrorKind::Unsupported,
            "destination filesystem does not support hard links",
        ),
    ))
}
