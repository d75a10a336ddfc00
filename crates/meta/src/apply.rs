//! Timestamp and permission propagation.

use std::fs;
use std::path::Path;

use filetime::{set_file_times, FileTime};

use crate::error::MetaError;

/// Applies `metadata`'s timestamps and permission bits to a freshly written
/// regular file.
///
/// Timestamps are set before the mode so a read-only source mode cannot block
/// the time update on hosts that refuse `utime` on read-only files.
pub fn apply_file_metadata(destination: &Path, metadata: &fs::Metadata) -> Result<(), MetaError> {
    make_times_settable(destination)?;
    set_timestamps(destination, metadata)?;
    set_mode(destination, metadata)
}

/// Restores a snapshot directory's timestamps and mode from the source
/// directory's stats captured at descent.
///
/// Called after the directory's subtree is fully populated; succeeds even
/// when the directory mode being restored is not writable.
pub fn restore_directory_metadata(
    destination: &Path,
    metadata: &fs::Metadata,
) -> Result<(), MetaError> {
    set_timestamps(destination, metadata)?;
    set_mode(destination, metadata)
}

fn set_timestamps(destination: &Path, metadata: &fs::Metadata) -> Result<(), MetaError> {
    let accessed = FileTime::from_last_access_time(metadata);
    let modified = FileTime::from_last_modification_time(metadata);
    set_file_times(destination, accessed, modified)
        .map_err(|error| MetaError::new("set timestamps on", destination, error))
}

fn set_mode(destination: &Path, metadata: &fs::Metadata) -> Result<(), MetaError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let permissions = fs::Permissions::from_mode(metadata.permissions().mode());
        fs::set_permissions(destination, permissions)
            .map_err(|error| MetaError::new("set permissions on", destination, error))
    }

    #[cfg(not(unix))]
    {
        let readonly = metadata.permissions().readonly();
        let mut permissions = fs::metadata(destination)
            .map_err(|error| MetaError::new("inspect permissions of", destination, error))?
            .permissions();
        permissions.set_readonly(readonly);
        fs::set_permissions(destination, permissions)
            .map_err(|error| MetaError::new("set permissions on", destination, error))
    }
}

// Read-only files refuse timestamp updates on Windows; lift the attribute
// until the final mode is applied.
#[cfg(windows)]
fn make_times_settable(destination: &Path) -> Result<(), MetaError> {
    let mut permissions = fs::metadata(destination)
        .map_err(|error| MetaError::new("inspect permissions of", destination, error))?
        .permissions();
    if permissions.readonly() {
        permissions.set_readonly(false);
        fs::set_permissions(destination, permissions)
            .map_err(|error| MetaError::new("set permissions on", destination, error))?;
    }
    Ok(())
}

#[cfg(not(windows))]
fn make_times_settable(_destination: &Path) -> Result<(), MetaError> {
    Ok(())
}
