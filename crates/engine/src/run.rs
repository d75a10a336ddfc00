//! The walk that builds one day's snapshot.

use std::ffi::{OsStr, OsString};
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use pdumpfs_filters::Matcher;
use pdumpfs_meta::UmaskGuard;

use crate::classify::{classify, Classification};
use crate::clock::RunClock;
use crate::error::{SnapshotError, SnapshotResult};
use crate::human::format_bytes;
use crate::locate::find_latest;
use crate::materialize;
use crate::report::Reporter;

/// Everything one snapshot run needs, passed as a plain value.
pub struct SnapshotRequest<'a> {
    /// Tree to back up.
    pub source: PathBuf,
    /// Existing destination root that receives date directories.
    pub destination: PathBuf,
    /// Final path segment under each date directory; derived from the
    /// source's basename when absent.
    pub base_name: Option<OsString>,
    /// Exclusion rules consulted for every walked entry.
    pub matcher: &'a dyn Matcher,
    /// Receives per-entry progress and skip warnings.
    pub reporter: &'a mut dyn Reporter,
    /// Invoked at every reported entry and every few copied blocks so a host
    /// event loop can pump messages. Must not re-enter the engine.
    pub interval: Option<&'a mut dyn FnMut()>,
    /// Classify and report only; never write below the destination.
    pub dry_run: bool,
    /// Append a completion line here after a successful run.
    pub log_file: Option<PathBuf>,
}

/// Aggregated outcome of a completed run.
#[derive(Clone, Debug)]
pub struct RunStats {
    /// The snapshot produced (or, for a dry run, the path it would get).
    pub snapshot_dir: PathBuf,
    /// Bytes written by file copies; hard links and symlinks count zero.
    pub bytes_written: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Builds today's snapshot, dating it by the current wall clock.
pub fn run(request: SnapshotRequest<'_>) -> SnapshotResult<RunStats> {
    run_at(request, RunClock::now())
}

/// Builds a snapshot dated by an explicit [`RunClock`].
///
/// Preflight rejects a missing source or destination, a destination inside
/// the source, and (where relevant) a destination filesystem without hard
/// links, all before any write. On success the destination's `latest`
/// symlink points at the new snapshot; on any fatal error the previous
/// `latest` is left untouched.
pub fn run_at(request: SnapshotRequest<'_>, clock: RunClock) -> SnapshotResult<RunStats> {
    let SnapshotRequest {
        source,
        destination,
        base_name,
        matcher,
        reporter,
        interval,
        dry_run,
        log_file,
    } = request;

    let started = Instant::now();

    let source = fs::canonicalize(&source).map_err(|_| SnapshotError::MissingSource(source))?;
    let source_metadata = fs::metadata(&source)
        .map_err(|error| SnapshotError::io("inspect source directory", &source, error))?;
    if !source_metadata.is_dir() {
        return Err(SnapshotError::SourceNotDirectory(source));
    }
    let destination = fs::canonicalize(&destination)
        .map_err(|_| SnapshotError::MissingDestination(destination))?;
    if pdumpfs_paths::is_same_or_below(&destination, &source) {
        return Err(SnapshotError::DestinationInsideSource {
            source_dir: source,
            destination,
        });
    }
    let base_name = resolve_base_name(base_name, &source)?;
    pdumpfs_meta::ensure_hard_link_capable(&destination)?;

    let _umask = UmaskGuard::apply(0o077);

    let date_dir = clock.date_dir();
    let snapshot_root = destination.join(&date_dir).join(&base_name);
    let prior = find_latest(&destination, &base_name, clock.date())?;

    tracing::debug!(
        source = %source.display(),
        snapshot = %snapshot_root.display(),
        prior = ?prior.as_ref().map(|p| p.root.as_path()),
        dry_run,
        "starting snapshot run"
    );

    if !dry_run {
        materialize::create_snapshot_root(&snapshot_root)?;
    }

    let mut walk = Walk {
        source_root: &source,
        snapshot_root: &snapshot_root,
        prior_root: prior.as_ref().map(|snapshot| snapshot.root.as_path()),
        matcher,
        reporter,
        interval,
        dry_run,
        bytes_written: 0,
        directories: Vec::new(),
    };
    walk.directories.push((snapshot_root.clone(), source_metadata));
    walk.descend(&source)?;
    if !dry_run {
        walk.restore_directories()?;
    }
    let bytes_written = walk.bytes_written;

    if !dry_run {
        pdumpfs_meta::force_symlink(&date_dir.join(&base_name), &destination.join("latest"))?;
    }

    let elapsed = started.elapsed();
    if !dry_run {
        if let Some(log_path) = &log_file {
            append_log_line(log_path, &clock, &source, &snapshot_root, elapsed, bytes_written)?;
        }
    }

    Ok(RunStats {
        snapshot_dir: snapshot_root,
        bytes_written,
        elapsed,
    })
}

struct Walk<'req, 'run> {
    source_root: &'run Path,
    snapshot_root: &'run Path,
    prior_root: Option<&'run Path>,
    matcher: &'req dyn Matcher,
    reporter: &'req mut dyn Reporter,
    interval: Option<&'req mut dyn FnMut()>,
    dry_run: bool,
    bytes_written: u64,
    // Snapshot directories paired with their source stats, restored in
    // collection order after the walk completes. Never cleared on entry
    // errors.
    directories: Vec<(PathBuf, fs::Metadata)>,
}

impl Walk<'_, '_> {
    fn descend(&mut self, directory: &Path) -> SnapshotResult<()> {
        let names = match read_sorted_names(directory) {
            Ok(names) => names,
            Err(error) if error.is_entry_recoverable() => {
                self.report_skip(directory, &error);
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        for name in names {
            let source_path = directory.join(&name);
            match self.process_entry(&source_path) {
                Ok(()) => {}
                Err(error) if error.is_entry_recoverable() => {
                    self.report_skip(&source_path, &error);
                }
                Err(error) => return Err(error),
            }
        }
        Ok(())
    }

    fn process_entry(&mut self, source_path: &Path) -> SnapshotResult<()> {
        let metadata = fs::symlink_metadata(source_path)
            .map_err(|error| SnapshotError::io("inspect", source_path, error))?;

        // An excluded directory prunes its whole subtree simply by not being
        // descended into.
        if self.matcher.excludes(source_path, &metadata) {
            tracing::debug!(path = %source_path.display(), "excluded");
            return Ok(());
        }

        let relative = pdumpfs_paths::make_relative(source_path, self.source_root);
        let prior = self.prior_root.map(|root| root.join(&relative));
        let target = self.snapshot_root.join(&relative);

        let classification = classify(&metadata, prior.as_deref());
        self.reporter.entry(classification, source_path);
        self.tick();

        if !self.dry_run {
            self.materialize_entry(
                classification,
                source_path,
                &target,
                prior.as_deref(),
                &metadata,
            )?;
            if classification != Classification::Unsupported {
                let follow = classification != Classification::Symlink;
                pdumpfs_meta::chown_if_root(&target, &metadata, follow)?;
            }
        }

        if classification == Classification::Directory {
            self.directories.push((target, metadata));
            self.descend(source_path)?;
        }
        Ok(())
    }

    fn materialize_entry(
        &mut self,
        classification: Classification,
        source: &Path,
        target: &Path,
        prior: Option<&Path>,
        metadata: &fs::Metadata,
    ) -> SnapshotResult<()> {
        match classification {
            Classification::Directory => materialize::create_directory(target),
            Classification::Unchanged => match prior {
                Some(prior) => materialize::link_to_prior(prior, target),
                // The prior entry vanished between classification and now;
                // fall back to a fresh copy.
                None => self.copy_entry(source, target, metadata),
            },
            Classification::Updated | Classification::NewFile => {
                self.copy_entry(source, target, metadata)
            }
            Classification::Symlink => materialize::recreate_symlink(source, target),
            Classification::Unsupported => Ok(()),
        }
    }

    fn copy_entry(
        &mut self,
        source: &Path,
        target: &Path,
        metadata: &fs::Metadata,
    ) -> SnapshotResult<()> {
        let interval = match &mut self.interval {
            Some(callback) => Some(&mut **callback as &mut dyn FnMut()),
            None => None,
        };
        let written = materialize::copy_file(source, target, metadata, interval)?;
        self.bytes_written += written;
        Ok(())
    }

    fn restore_directories(&mut self) -> SnapshotResult<()> {
        for (path, metadata) in &self.directories {
            pdumpfs_meta::restore_directory_metadata(path, metadata)?;
        }
        Ok(())
    }

    fn report_skip(&mut self, path: &Path, error: &SnapshotError) {
        tracing::warn!(path = %path.display(), %error, "skipping entry");
        if let Some(io_error) = error.io_source() {
            self.reporter.skipped(path, io_error);
        }
        self.tick();
    }

    fn tick(&mut self) {
        if let Some(callback) = self.interval.as_deref_mut() {
            callback();
        }
    }
}

fn resolve_base_name(requested: Option<OsString>, source: &Path) -> SnapshotResult<OsString> {
    match requested {
        Some(name) if !name.is_empty() => Ok(name),
        _ => source
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| SnapshotError::MissingBaseName(source.to_path_buf())),
    }
}

fn read_sorted_names(directory: &Path) -> SnapshotResult<Vec<OsString>> {
    let entries = fs::read_dir(directory)
        .map_err(|error| SnapshotError::io("read directory", directory, error))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|error| SnapshotError::io("read directory", directory, error))?;
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

fn append_log_line(
    log_path: &Path,
    clock: &RunClock,
    source: &Path,
    snapshot_root: &Path,
    elapsed: Duration,
    bytes_written: u64,
) -> SnapshotResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|error| SnapshotError::io("open log file", log_path, error))?;
    writeln!(
        file,
        "{}: {} -> {} (in {:.2} sec, {} written)",
        clock.log_timestamp(),
        source.display(),
        snapshot_root.display(),
        elapsed.as_secs_f64(),
        format_bytes(bytes_written)
    )
    .map_err(|error| SnapshotError::io("append to log file", log_path, error))
}
