#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `pdumpfs_engine` builds daily snapshots of a source tree. Each run
//! materializes `DEST/YYYY/MM/DD/BASE` as a full-looking copy of the source,
//! hard-linking regular files that are unchanged (same size and mtime) since
//! the most recent prior snapshot and copying everything else, so the disk
//! cost of a snapshot approximates the day's changes while every snapshot
//! stays independently browsable and deletable.
//!
//! # Design
//!
//! - [`locate::find_latest`] discovers the newest prior snapshot strictly
//!   before today by scanning the fixed `YYYY/MM/DD` shape under the
//!   destination.
//! - [`classify::classify`] assigns every walked entry a
//!   [`Classification`] from its `lstat` data and the corresponding entry in
//!   the prior snapshot.
//! - [`run::run`] drives the pre-order walk: exclusion checks prune or skip,
//!   classifications map to filesystem actions, directory metadata is
//!   restored after the walk, and the `latest` symlink plus an optional log
//!   line record the completed run.
//! - Hosts observe the run through a [`Reporter`] and an optional interval
//!   callback invoked at every entry and every few copied blocks; fatal
//!   failures surface as [`SnapshotError`].
//!
//! # Invariants
//!
//! - The walk is pre-order, so a directory exists before its contents are
//!   materialized; directory times and modes are restored only after the
//!   whole walk finishes.
//! - Entries that vanish or refuse access mid-walk are reported and skipped;
//!   any other failure aborts the run and leaves the previous `latest`
//!   pointer untouched.
//! - A dry run performs locating, classification, and reporting but never
//!   creates, modifies, or removes anything under the destination.

pub mod classify;
pub mod clock;
pub mod error;
pub mod human;
pub mod locate;
pub mod report;
pub mod run;

mod materialize;

pub use classify::{classify, same_file, Classification};
pub use clock::RunClock;
pub use error::{SnapshotError, SnapshotResult};
pub use human::format_bytes;
pub use locate::{find_latest, PriorSnapshot};
pub use report::{NullReporter, Reporter};
pub use run::{run, run_at, RunStats, SnapshotRequest};
