//! Forced creation of hard links and symbolic links.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::MetaError;

/// Creates a hard link at `destination` sharing `source`'s inode.
///
/// Any existing object at `destination` is unlinked first so repeated runs
/// over the same date directory converge.
pub fn force_hard_link(source: &Path, destination: &Path) -> Result<(), MetaError> {
    remove_existing(destination)?;
    fs::hard_link(source, destination)
        .map_err(|error| MetaError::new("create hard link at", destination, error))
}

/// Recreates a symbolic link at `destination` with the given `target` text.
///
/// Any existing object at `destination` is unlinked first. On platforms
/// without symlink support the operation is silently skipped and the
/// destination entry is simply absent.
#[cfg(unix)]
pub fn force_symlink(target: &Path, destination: &Path) -> Result<(), MetaError> {
    remove_existing(destination)?;
    std::os::unix::fs::symlink(target, destination)
        .map_err(|error| MetaError::new("create symlink at", destination, error))
}

/// Recreates a symbolic link at `destination` with the given `target` text.
///
/// Symlink creation is unsupported here, so the call is a silent no-op.
#[cfg(not(unix))]
pub fn force_symlink(_target: &Path, _destination: &Path) -> Result<(), MetaError> {
    Ok(())
}

/// Reads the target text of the symbolic link at `path`.
pub fn read_link_target(path: &Path) -> Result<PathBuf, MetaError> {
    fs::read_link(path).map_err(|error| MetaError::new("read symlink", path, error))
}

fn remove_existing(destination: &Path) -> Result<(), MetaError> {
    match fs::remove_file(destination) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(MetaError::new("replace existing entry at", destination, error)),
    }
}
