//! Discovery of the most recent prior snapshot.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use time::{Date, Month};

use crate::error::{SnapshotError, SnapshotResult};

/// A prior snapshot selected as the hard-link reference for this run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriorSnapshot {
    /// Full `DEST/YYYY/MM/DD/BASE` path of the snapshot root.
    pub root: PathBuf,
    /// The snapshot's calendar date.
    pub date: Date,
}

/// Finds the newest `destination/YYYY/MM/DD/base_name` strictly before
/// `today`.
///
/// Candidates must have the exact zero-padded digit shape, name a valid
/// calendar date, and contain `base_name` as a directory. Today's own date is
/// deliberately refused so a same-day rerun rebuilds a fresh tree instead of
/// hard-linking the snapshot onto itself. Unreadable date subdirectories are
/// skipped; only the destination root failing to list is fatal.
pub fn find_latest(
    destination: &Path,
    base_name: &OsStr,
    today: Date,
) -> SnapshotResult<Option<PriorSnapshot>> {
    let mut candidates = scan_date_dirs(destination)?;
    candidates.sort_by(|a, b| b.0.cmp(&a.0));

    for ((year, month, day), date_dir) in candidates {
        let Ok(month) = Month::try_from(month) else {
            continue;
        };
        let Ok(date) = Date::from_calendar_date(year, month, day) else {
            continue;
        };
        if date >= today {
            continue;
        }
        let root = date_dir.join(base_name);
        if root.is_dir() {
            tracing::debug!(snapshot = %root.display(), %date, "found prior snapshot");
            return Ok(Some(PriorSnapshot { root, date }));
        }
    }

    tracing::debug!(destination = %destination.display(), "no prior snapshot");
    Ok(None)
}

type DatedDir = ((i32, u8, u8), PathBuf);

fn scan_date_dirs(destination: &Path) -> SnapshotResult<Vec<DatedDir>> {
    let mut found = Vec::new();
    let years = read_dir_or_fail(destination)?;
    for (year_name, year_path) in years {
        let Some(year) = parse_fixed_digits(&year_name, 4) else {
            continue;
        };
        for (month_name, month_path) in read_dir_or_skip(&year_path) {
            let Some(month) = parse_fixed_digits(&month_name, 2) else {
                continue;
            };
            for (day_name, day_path) in read_dir_or_skip(&month_path) {
                let Some(day) = parse_fixed_digits(&day_name, 2) else {
                    continue;
                };
                found.push(((year as i32, month as u8, day as u8), day_path));
            }
        }
    }
    Ok(found)
}

fn read_dir_or_fail(path: &Path) -> SnapshotResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(path)
        .map_err(|error| SnapshotError::io("read destination directory", path, error))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|error| SnapshotError::io("read destination directory", path, error))?;
        push_if_dir(&mut dirs, &entry);
    }
    Ok(dirs)
}

fn read_dir_or_skip(path: &Path) -> Vec<(String, PathBuf)> {
    let mut dirs = Vec::new();
    let Ok(entries) = fs::read_dir(path) else {
        tracing::debug!(path = %path.display(), "skipping unreadable date directory");
        return dirs;
    };
    for entry in entries.flatten() {
        push_if_dir(&mut dirs, &entry);
    }
    dirs
}

fn push_if_dir(dirs: &mut Vec<(String, PathBuf)>, entry: &fs::DirEntry) {
    let is_dir = entry
        .file_type()
        .map(|file_type| file_type.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return;
    }
    if let Ok(name) = entry.file_name().into_string() {
        dirs.push((name, entry.path()));
    }
}

fn parse_fixed_digits(text: &str, width: usize) -> Option<u32> {
    if text.len() != width || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
