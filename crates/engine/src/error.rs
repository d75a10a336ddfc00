//! Fatal error types for snapshot runs.
//!
//! Recoverable per-entry conditions never appear here; they are delivered to
//! the caller's [`Reporter`](crate::report::Reporter) as warnings while the
//! walk continues.

use std::io;
use std::path::{Path, PathBuf};

use pdumpfs_meta::MetaError;
use thiserror::Error;

/// Result type for engine operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Errors that abort a snapshot run.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The source directory is missing or cannot be resolved.
    #[error("source directory '{}' is not accessible", .0.display())]
    MissingSource(PathBuf),
    /// The source path exists but is not a directory.
    #[error("source '{}' is not a directory", .0.display())]
    SourceNotDirectory(PathBuf),
    /// The destination directory is missing or cannot be resolved; it must
    /// exist before the run starts.
    #[error("destination directory '{}' is not accessible", .0.display())]
    MissingDestination(PathBuf),
    /// The destination is the source itself or lives inside it, which would
    /// make the backup recurse into its own output.
    #[error(
        "destination '{}' must not be '{}' or live below it",
        .destination.display(),
        .source_dir.display()
    )]
    DestinationInsideSource {
        /// Canonicalized source root.
        source_dir: PathBuf,
        /// Canonicalized destination root.
        destination: PathBuf,
    },
    /// No base name was given and none can be derived from the source path.
    #[error("cannot derive a base name from '{}'; pass BASE explicitly", .0.display())]
    MissingBaseName(PathBuf),
    /// A filesystem operation failed.
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        /// Operation being attempted.
        action: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A metadata operation failed.
    #[error(transparent)]
    Metadata(#[from] MetaError),
}

impl SnapshotError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Reports whether this error belongs to the per-entry recoverable
    /// family: the underlying object vanished or refused access.
    ///
    /// The walker downgrades such failures to reporter warnings and moves on
    /// to the next entry.
    #[must_use]
    pub fn is_entry_recoverable(&self) -> bool {
        let kind = match self {
            Self::Io { source, .. } => source.kind(),
            Self::Metadata(error) => error.source_error().kind(),
            _ => return false,
        };
        matches!(
            kind,
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
        )
    }

    /// Returns the underlying I/O error when one exists.
    #[must_use]
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Metadata(error) => Some(error.source_error()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanished_entries_are_recoverable() {
        let error = SnapshotError::io(
            "inspect",
            Path::new("/gone"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(error.is_entry_recoverable());
    }

    #[test]
    fn forbidden_entries_are_recoverable() {
        let error = SnapshotError::io(
            "open",
            Path::new("/secret"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(error.is_entry_recoverable());
    }

    #[test]
    fn write_failures_are_fatal() {
        let error = SnapshotError::io(
            "write",
            Path::new("/full"),
            io::Error::from(io::ErrorKind::StorageFull),
        );
        assert!(!error.is_entry_recoverable());
    }

    #[test]
    fn preflight_errors_are_fatal() {
        assert!(!SnapshotError::MissingSource(PathBuf::from("/x")).is_entry_recoverable());
    }
}
