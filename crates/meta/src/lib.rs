#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `pdumpfs_meta` is the platform seam of the snapshot engine. It wraps the
//! filesystem operations whose behavior differs across hosts (hard-link and
//! symlink creation, timestamp and permission propagation, ownership
//! preservation, umask manipulation, and the hard-link capability probe)
//! behind small functions with POSIX semantics. The engine depends only on
//! this capability set and never dispatches on the platform itself.
//!
//! # Design
//!
//! - Creation helpers are *forced*: [`force_hard_link`] and
//!   [`force_symlink`] unlink any existing object at the destination first,
//!   so re-running a snapshot on the same day converges instead of failing
//!   with `AlreadyExists`.
//! - [`apply_file_metadata`] and [`restore_directory_metadata`] set
//!   timestamps before permission bits; on hosts where read-only files
//!   refuse timestamp updates the destination is made writable first.
//! - Ownership propagation is a no-op unless the process runs as root, and
//!   uses `lchown` semantics for symbolic links.
//! - Non-Unix hosts get conservative stubs: symlink recreation is silently
//!   skipped and the capability probe refuses the destination.
//!
//! # Errors
//!
//! All fallible operations surface [`MetaError`], which records the
//! operation context, the path involved, and the underlying
//! [`io::Error`](std::io::Error).

use std::fs;

mod apply;
mod capability;
mod error;
mod link;
mod owner;
mod umask;

pub use apply::{apply_file_metadata, restore_directory_metadata};
pub use capability::{ensure_hard_link_capable, filesystem_id, FilesystemId};
pub use error::MetaError;
pub use link::{force_hard_link, force_symlink, read_link_target};
pub use owner::chown_if_root;
pub use umask::UmaskGuard;

/// File type observed through `lstat`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Anything else (device, socket, FIFO, ...).
    Other,
}

/// Classifies `metadata` captured with [`fs::symlink_metadata`].
#[must_use]
pub fn file_kind(metadata: &fs::Metadata) -> FileKind {
    let file_type = metadata.file_type();
    if file_type.is_dir() {
        FileKind::Directory
    } else if file_type.is_symlink() {
        FileKind::Symlink
    } else if file_type.is_file() {
        FileKind::File
    } else {
        FileKind::Other
    }
}
