//! Progress reporting seam between the engine and its host.

use std::io;
use std::path::Path;

use crate::classify::Classification;

/// Receives per-entry progress and warnings from a snapshot run.
///
/// The engine calls [`entry`](Self::entry) exactly once for every visited
/// entry, including excluded-adjacent unsupported ones, in walk order.
/// [`skipped`](Self::skipped) delivers the recoverable failures (entry
/// vanished, permission denied) that the walk survives; they are warnings,
/// not errors, and never change the run's outcome.
///
/// Implementations must not re-enter the engine and should return quickly;
/// the copy loop is suspended while a callback runs.
pub trait Reporter {
    /// Reports one visited entry and its classification.
    fn entry(&mut self, classification: Classification, source: &Path);

    /// Reports an entry that was skipped after a recoverable error.
    fn skipped(&mut self, source: &Path, error: &io::Error);
}

/// Reporter that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn entry(&mut self, _classification: Classification, _source: &Path) {}

    fn skipped(&mut self, _source: &Path, _error: &io::Error) {}
}
