//! Console rendering of engine progress.

use std::io::{self, Write};
use std::path::Path;

use pdumpfs_engine::{Classification, Reporter};

// Wide enough for the longest tag ("unsupported", 11 characters).
const TAG_WIDTH: usize = 12;

/// Prints one fixed-width tag plus the source path per visited entry, and a
/// `pdumpfs:`-prefixed warning line for every skipped entry.
///
/// Write failures on the progress stream are ignored; progress output must
/// never abort a backup.
pub(crate) struct ConsoleReporter<'a> {
    out: Box<dyn Write + 'a>,
    err: &'a mut dyn Write,
}

impl<'a> ConsoleReporter<'a> {
    pub(crate) fn new(out: Box<dyn Write + 'a>, err: &'a mut dyn Write) -> Self {
        Self { out, err }
    }
}

impl Reporter for ConsoleReporter<'_> {
    fn entry(&mut self, classification: Classification, source: &Path) {
        let _ = writeln!(
            self.out,
            "{:<width$} {}",
            classification.tag(),
            source.display(),
            width = TAG_WIDTH
        );
    }

    fn skipped(&mut self, source: &Path, error: &io::Error) {
        let _ = writeln!(
            self.err,
            "pdumpfs: skipped '{}': {}",
            source.display(),
            error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_tagged_and_padded() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        {
            let mut reporter = ConsoleReporter::new(Box::new(&mut out), &mut err);
            reporter.entry(Classification::NewFile, Path::new("/src/a.txt"));
            reporter.entry(Classification::Directory, Path::new("/src/sub"));
        }

        let text = String::from_utf8(out).expect("utf-8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("new_file     /src/a.txt"));
        assert_eq!(lines.next(), Some("directory    /src/sub"));
        assert!(err.is_empty());
    }

    #[test]
    fn skips_go_to_the_error_stream() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        {
            let mut reporter = ConsoleReporter::new(Box::new(&mut out), &mut err);
            reporter.skipped(
                Path::new("/src/locked"),
                &io::Error::from(io::ErrorKind::PermissionDenied),
            );
        }

        assert!(out.is_empty());
        let text = String::from_utf8(err).expect("utf-8");
        assert!(text.starts_with("pdumpfs: skipped '/src/locked':"));
    }
}
