//! Argument grammar for the `pdumpfs` binary.

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

pub(crate) fn build_command() -> Command {
    Command::new("pdumpfs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Back up a directory tree into daily snapshots, hard-linking unchanged files")
        .disable_version_flag(true)
        .arg(
            Arg::new("source")
                .value_name("SRC")
                .help("Directory tree to back up")
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("destination")
                .value_name("DEST")
                .help("Existing destination root that receives YYYY/MM/DD snapshots")
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("base")
                .value_name("BASE")
                .help("Name of the snapshot directory under each date [default: basename of SRC]"),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .value_name("REGEX")
                .help("Skip paths matching this regular expression (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("exclude-by-size")
                .long("exclude-by-size")
                .value_name("SIZE")
                .help("Skip regular files of at least SIZE bytes (suffixes K, M, G, T, P)"),
        )
        .arg(
            Arg::new("exclude-by-glob")
                .long("exclude-by-glob")
                .value_name("GLOB")
                .help("Skip regular files whose basename matches this glob (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("log-file")
                .short('l')
                .long("log-file")
                .value_name("PATH")
                .help("Append a completion line to this file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress normal output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Classify and report without writing anything")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("backtrace")
                .long("backtrace")
                .help("Print a backtrace when the run aborts")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .help("Print version")
                .action(ArgAction::Version),
        )
}
