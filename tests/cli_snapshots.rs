//! End-to-end tests that drive the installed `pdumpfs` binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn pdumpfs() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pdumpfs"))
}

fn run_ok(command: &mut Command) -> Output {
    let output = command.output().expect("spawn pdumpfs");
    assert!(
        output.status.success(),
        "pdumpfs failed\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn seed_tree(root: &Path) {
    fs::create_dir_all(root.join("sub")).expect("mkdir sub");
    fs::write(root.join("a.txt"), b"aaaaaaaaaa").expect("write a");
    fs::write(root.join("sub/b.txt"), b"bbbbbbbbbbbbbbbbbbbb").expect("write b");
}

fn todays_snapshot(destination: &Path, base: &str) -> PathBuf {
    // The binary dates snapshots with the real clock, so recover the path
    // through the latest pointer where possible and by scanning otherwise.
    let latest = destination.join("latest");
    if latest.is_dir() {
        return latest;
    }
    let mut candidates = Vec::new();
    collect_dirs(destination, 3, &mut candidates);
    candidates.sort();
    let newest = candidates.pop().expect("at least one date dir");
    newest.join(base)
}

fn collect_dirs(root: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth == 0 {
        out.push(root.to_path_buf());
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() && path.file_name().is_some_and(|name| name != "latest") {
            collect_dirs(&path, depth - 1, out);
        }
    }
}

#[test]
fn backs_up_a_tree_and_reports_progress() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("data");
    let destination = temp.path().join("backup");
    seed_tree(&source);
    fs::create_dir(&destination).expect("mkdir dest");

    let output = run_ok(pdumpfs().arg(&source).arg(&destination));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("new_file"), "stdout: {stdout}");
    assert!(stdout.contains("directory"), "stdout: {stdout}");
    assert!(stdout.contains("30B written)"), "stdout: {stdout}");

    let snapshot = todays_snapshot(&destination, "data");
    assert_eq!(fs::read(snapshot.join("a.txt")).expect("read a"), b"aaaaaaaaaa");
    assert_eq!(
        fs::read(snapshot.join("sub/b.txt")).expect("read b"),
        b"bbbbbbbbbbbbbbbbbbbb"
    );
}

#[cfg(unix)]
#[test]
fn rerun_hard_links_nothing_on_the_same_day_but_succeeds() {
    use std::os::unix::fs::MetadataExt;

    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("data");
    let destination = temp.path().join("backup");
    seed_tree(&source);
    fs::create_dir(&destination).expect("mkdir dest");

    run_ok(pdumpfs().arg(&source).arg(&destination));
    run_ok(pdumpfs().arg(&source).arg(&destination));

    let snapshot = todays_snapshot(&destination, "data");
    let metadata = fs::metadata(snapshot.join("a.txt")).expect("metadata");
    assert_eq!(metadata.nlink(), 1, "same-day rerun rebuilds fresh files");
    assert_eq!(fs::read(snapshot.join("a.txt")).expect("read"), b"aaaaaaaaaa");
}

#[test]
fn exclude_glob_skips_matching_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("data");
    let destination = temp.path().join("backup");
    seed_tree(&source);
    fs::write(source.join("scratch.tmp"), b"scratch").expect("write tmp");
    fs::create_dir(&destination).expect("mkdir dest");

    run_ok(
        pdumpfs()
            .arg("--exclude-by-glob=*.tmp")
            .arg(&source)
            .arg(&destination),
    );

    let snapshot = todays_snapshot(&destination, "data");
    assert!(snapshot.join("a.txt").is_file());
    assert!(!snapshot.join("scratch.tmp").exists());
}

#[test]
fn quiet_dry_run_emits_nothing_and_writes_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("data");
    let destination = temp.path().join("backup");
    seed_tree(&source);
    fs::create_dir(&destination).expect("mkdir dest");

    let output = run_ok(pdumpfs().args(["-q", "-n"]).arg(&source).arg(&destination));

    assert!(output.stdout.is_empty());
    let leftovers: Vec<_> = fs::read_dir(&destination)
        .expect("read dir")
        .collect::<Result<_, _>>()
        .expect("entries");
    assert!(leftovers.is_empty());
}

#[test]
fn destination_inside_source_is_a_fatal_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("data");
    let destination = source.join("backup");
    fs::create_dir_all(&destination).expect("mkdir");

    let output = pdumpfs()
        .arg(&source)
        .arg(&destination)
        .output()
        .expect("spawn pdumpfs");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("pdumpfs:"), "stderr: {stderr}");
}

#[test]
fn help_and_version_exit_zero() {
    let help = pdumpfs().arg("--help").output().expect("spawn");
    assert_eq!(help.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&help.stdout).contains("SRC"));

    let version = pdumpfs().arg("-v").output().expect("spawn");
    assert_eq!(version.status.code(), Some(0));
}

#[test]
fn unknown_flag_exits_one() {
    let output = pdumpfs().arg("--frobnicate").output().expect("spawn");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn log_file_gains_a_completion_line() {
    let temp = tempfile::tempdir().expect("tempdir");
    let source = temp.path().join("data");
    let destination = temp.path().join("backup");
    let log = temp.path().join("backup.log");
    seed_tree(&source);
    fs::create_dir(&destination).expect("mkdir dest");

    run_ok(
        pdumpfs()
            .arg("--log-file")
            .arg(&log)
            .arg(&source)
            .arg(&destination),
    );

    let contents = fs::read_to_string(&log).expect("read log");
    let line = contents.lines().next().expect("one line");
    assert!(line.contains(" -> "), "line: {line}");
    assert!(line.ends_with("written)"), "line: {line}");
}
