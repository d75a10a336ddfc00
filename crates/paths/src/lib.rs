#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `pdumpfs_paths` collects the pure path arithmetic used by the snapshot
//! engine: building zero-padded `YYYY/MM/DD` date segments, stripping a
//! source root off a walked path, testing path containment, and recovering a
//! date triple from the tail of a snapshot directory. Nothing here touches
//! the filesystem; callers are expected to pass canonicalized paths where the
//! documentation asks for them.
//!
//! # Invariants
//!
//! - [`date_dir`] always produces exactly three components of widths 4, 2,
//!   and 2, so date directories sort lexicographically in calendar order.
//! - [`make_relative`] never returns a path with a leading separator, and
//!   returns the empty path iff `child == base`.
//! - [`parse_date_tail`] is the inverse of [`date_dir`] over the final three
//!   components; it validates shape only, not calendar validity.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Builds the `YYYY/MM/DD` relative path for a snapshot date.
///
/// Components are zero-padded to fixed widths (4/2/2) so that a descending
/// lexicographic sort over date directories is a descending calendar sort.
///
/// # Examples
///
/// ```
/// use pdumpfs_paths::date_dir;
/// use std::path::PathBuf;
///
/// let dir = date_dir(2026, 8, 2);
/// assert_eq!(dir, PathBuf::from("2026").join("08").join("02"));
/// ```
#[must_use]
pub fn date_dir(year: i32, month: u8, day: u8) -> PathBuf {
    let mut path = PathBuf::from(format!("{year:04}"));
    path.push(format!("{month:02}"));
    path.push(format!("{day:02}"));
    path
}

/// Strips one leading `base` (plus the separator that follows it) from
/// `child`.
///
/// Returns the empty path when `child == base` and `child` unchanged when it
/// does not live below `base`. The result never starts with a separator.
#[must_use]
pub fn make_relative(child: &Path, base: &Path) -> PathBuf {
    match child.strip_prefix(base) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => child.to_path_buf(),
    }
}

/// Reports whether `candidate` equals `ancestor` or lives anywhere below it.
///
/// Both paths must already be canonicalized; the comparison is purely
/// component-wise and never consults the filesystem.
#[must_use]
pub fn is_same_or_below(candidate: &Path, ancestor: &Path) -> bool {
    candidate == ancestor || candidate.starts_with(ancestor)
}

/// Splits a path into its normal components, root to leaf.
///
/// Root and prefix components (`/`, drive letters) are dropped so the result
/// contains only real directory and file names.
#[must_use]
pub fn split_components(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_os_string()),
            _ => None,
        })
        .collect()
}

/// Recovers a `(year, month, day)` triple from the final three components of
/// `path`.
///
/// The components must have the exact `YYYY`/`MM`/`DD` digit widths produced
/// by [`date_dir`]. Calendar validity (month ranges, leap days) is left to
/// the caller.
#[must_use]
pub fn parse_date_tail(path: &Path) -> Option<(i32, u8, u8)> {
    let components = split_components(path);
    if components.len() < 3 {
        return None;
    }
    let tail = &components[components.len() - 3..];
    let year = parse_fixed_digits(&tail[0], 4)?;
    let month = parse_fixed_digits(&tail[1], 2)?;
    let day = parse_fixed_digits(&tail[2], 2)?;
    Some((year as i32, month as u8, day as u8))
}

fn parse_fixed_digits(component: &OsString, width: usize) -> Option<u32> {
    let text = component.to_str()?;
    if text.len() != width || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn date_dir_zero_pads_components() {
        assert_eq!(
            date_dir(999, 1, 5),
            PathBuf::from("0999").join("01").join("05")
        );
    }

    #[test]
    fn date_dirs_sort_lexicographically_in_calendar_order() {
        let older = date_dir(2025, 12, 31);
        let newer = date_dir(2026, 1, 1);
        assert!(older.as_os_str() < newer.as_os_str());
    }

    #[test]
    fn make_relative_strips_base() {
        let relative = make_relative(Path::new("/data/src/sub/file"), Path::new("/data/src"));
        assert_eq!(relative, PathBuf::from("sub/file"));
    }

    #[test]
    fn make_relative_of_base_itself_is_empty() {
        let relative = make_relative(Path::new("/data/src"), Path::new("/data/src"));
        assert!(relative.as_os_str().is_empty());
    }

    #[test]
    fn make_relative_leaves_unrelated_paths_alone() {
        let relative = make_relative(Path::new("/other/file"), Path::new("/data/src"));
        assert_eq!(relative, PathBuf::from("/other/file"));
    }

    #[test]
    fn same_or_below_accepts_equal_and_descendant() {
        assert!(is_same_or_below(Path::new("/a/b"), Path::new("/a/b")));
        assert!(is_same_or_below(Path::new("/a/b/c"), Path::new("/a/b")));
    }

    #[test]
    fn same_or_below_rejects_sibling_with_shared_prefix() {
        assert!(!is_same_or_below(Path::new("/a/bc"), Path::new("/a/b")));
        assert!(!is_same_or_below(Path::new("/a"), Path::new("/a/b")));
    }

    #[test]
    fn split_components_drops_root() {
        let components = split_components(Path::new("/backup/2026/08/02"));
        assert_eq!(
            components,
            vec![
                OsString::from("backup"),
                OsString::from("2026"),
                OsString::from("08"),
                OsString::from("02"),
            ]
        );
    }

    #[test]
    fn parse_date_tail_round_trips_date_dir() {
        let path = Path::new("/backup").join(date_dir(2026, 8, 2));
        assert_eq!(parse_date_tail(&path), Some((2026, 8, 2)));
    }

    #[test]
    fn parse_date_tail_rejects_wrong_widths() {
        assert_eq!(parse_date_tail(Path::new("/backup/2026/8/02")), None);
        assert_eq!(parse_date_tail(Path::new("/backup/26/08/02")), None);
        assert_eq!(parse_date_tail(Path::new("/backup/2026/08/2x")), None);
    }

    #[test]
    fn parse_date_tail_requires_three_components() {
        assert_eq!(parse_date_tail(Path::new("08/02")), None);
    }
}
