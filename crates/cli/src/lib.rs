#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `pdumpfs_cli` is the command-line frontend of the snapshot engine. It
//! parses `SRC DEST [BASE]` plus the exclusion, logging, and dry-run options,
//! wires a console reporter into the engine, and maps outcomes onto process
//! exit codes: `0` for success (including `--help`/`--version`), `1` for any
//! fatal error. Per-entry warnings are printed to stderr and never change the
//! exit code.
//!
//! # Design
//!
//! [`run`] takes the argument iterator together with explicit stdout/stderr
//! writers so the whole frontend is testable without spawning a process; the
//! binary converts the returned status with [`exit_code_from`]. Diagnostics
//! beyond the frozen progress format go through `tracing`, initialised here
//! against `PDUMPFS_LOG`/`RUST_LOG`.

use std::backtrace::Backtrace;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use pdumpfs_engine::{format_bytes, run as run_snapshot, SnapshotRequest};
use pdumpfs_filters::{parse_size_limit, ExcludeSet};

mod command;
mod reporter;

use command::build_command;
use reporter::ConsoleReporter;

/// Parses `arguments` and performs one snapshot run.
///
/// Returns the process status: `0` on success, help, or version; `1` on any
/// fatal error.
pub fn run<Args, Out, Err>(arguments: Args, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Args: IntoIterator,
    Args::Item: Into<OsString> + Clone,
    Out: Write,
    Err: Write,
{
    let matches = match build_command().try_get_matches_from(arguments) {
        Ok(matches) => matches,
        Err(error) => {
            return match error.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    let _ = write!(stdout, "{}", error.render());
                    0
                }
                _ => {
                    let _ = write!(stderr, "{}", error.render());
                    1
                }
            };
        }
    };

    init_tracing();

    let source = matches
        .get_one::<PathBuf>("source")
        .expect("SRC is required")
        .clone();
    let destination = matches
        .get_one::<PathBuf>("destination")
        .expect("DEST is required")
        .clone();
    let base_name = matches.get_one::<String>("base").map(OsString::from);
    let log_file = matches.get_one::<PathBuf>("log-file").cloned();
    let quiet = matches.get_flag("quiet");
    let dry_run = matches.get_flag("dry-run");
    let backtrace = matches.get_flag("backtrace");

    let mut rules = ExcludeSet::new();
    if let Some(patterns) = matches.get_many::<String>("exclude") {
        for pattern in patterns {
            if let Err(error) = rules.add_pattern(pattern) {
                let _ = writeln!(stderr, "pdumpfs: {error}");
                return 1;
            }
        }
    }
    if let Some(globs) = matches.get_many::<String>("exclude-by-glob") {
        for glob in globs {
            if let Err(error) = rules.add_glob(glob) {
                let _ = writeln!(stderr, "pdumpfs: {error}");
                return 1;
            }
        }
    }
    if let Some(size) = matches.get_one::<String>("exclude-by-size") {
        match parse_size_limit(size) {
            Ok(limit) => rules.set_size_limit(limit),
            Err(error) => {
                let _ = writeln!(stderr, "pdumpfs: {error}");
                return 1;
            }
        }
    }

    let progress: Box<dyn Write + '_> = if quiet {
        Box::new(io::sink())
    } else {
        Box::new(&mut *stdout)
    };
    let mut reporter = ConsoleReporter::new(progress, &mut *stderr);

    let result = run_snapshot(SnapshotRequest {
        source: source.clone(),
        destination,
        base_name,
        matcher: &rules,
        reporter: &mut reporter,
        interval: None,
        dry_run,
        log_file,
    });
    drop(reporter);

    match result {
        Ok(stats) => {
            if !quiet && !dry_run {
                let _ = writeln!(
                    stdout,
                    "{} -> {} (in {:.2} sec, {} written)",
                    source.display(),
                    stats.snapshot_dir.display(),
                    stats.elapsed.as_secs_f64(),
                    format_bytes(stats.bytes_written)
                );
            }
            0
        }
        Err(error) => {
            let _ = writeln!(stderr, "pdumpfs: {error}");
            if backtrace {
                let _ = writeln!(stderr, "{}", Backtrace::force_capture());
            }
            1
        }
    }
}

/// Converts a status returned by [`run`] into an [`ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> ExitCode {
    ExitCode::from(status.clamp(0, u8::MAX as i32) as u8)
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("PDUMPFS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
