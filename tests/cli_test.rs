use std::process::Command;

use dmsearch::cli::workflows::build_db::{build_and_save, BuildConfig};
use dmsearch::prelude::*;

mod common;
use common::write_pdb;

fn build(dir: &std::path::Path, paths: Vec<String>) -> String {
    let output = dir.join("cli.dmdb").to_string_lossy().to_string();
    let cfg = BuildConfig {
        paths,
        output: output.clone(),
        window_size: 5,
        intra_chain: false,
        atom_name: DEFAULT_ATOM_NAME.to_string(),
        verbosity: Verbosity::default(),
    };
    build_and_save(&cfg).expect("Failed to build database");
    output
}

fn run_dmsearch(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_dmsearch"))
        .args(args)
        .output()
        .expect("Failed to run dmsearch")
}

#[test]
fn test_stdout_marks_rounds_of_multi_chain_query() {
    let dir = tempfile::tempdir().unwrap();
    let query = write_pdb(dir.path(), "query.pdb", &[('A', 9), ('B', 9), ('C', 9)], 2.3);
    let database = build(dir.path(), vec![query.clone()]);

    let output = run_dmsearch(&["query", "-p", &query, "-m", "standard", "-w", "5", "-d", &database]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let rounds: Vec<&str> = stdout.lines().filter(|line| line.starts_with("# round")).collect();
    assert_eq!(rounds, vec!["# round A:B", "# round A:C", "# round B:C"]);
    // one result per round, ranks restart after each marker
    let ranks: Vec<&str> = stdout
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| line.split('\t').next().unwrap_or(""))
        .collect();
    assert_eq!(ranks, vec!["1", "1", "1"]);
}

#[test]
fn test_stdout_single_round_has_no_marker() {
    let dir = tempfile::tempdir().unwrap();
    let query = write_pdb(dir.path(), "query.pdb", &[('A', 10), ('B', 10)], 2.3);
    let database = build(dir.path(), vec![query.clone()]);

    let output = run_dmsearch(&["query", "-p", &query, "-m", "diagonal", "-w", "5", "-d", &database]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    assert!(!stdout.contains("# round"));
}

#[test]
fn test_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let query = write_pdb(dir.path(), "query.pdb", &[('A', 10), ('B', 10)], 2.3);
    let database = build(dir.path(), vec![query.clone()]);

    let missing = run_dmsearch(&["query", "-p", &query, "-w", "5", "-d", &database]);
    assert_eq!(missing.status.code(), Some(2));
    let no_windows = run_dmsearch(&["query", "-p", &query, "-m", "standard", "-w", "11", "-d", &database]);
    assert_eq!(no_windows.status.code(), Some(4));
    let no_database = run_dmsearch(&["query", "-p", &query, "-m", "standard", "-w", "5", "-d", "missing.dmdb"]);
    assert_eq!(no_database.status.code(), Some(3));
    assert_eq!(run_dmsearch(&["query", "--help"]).status.code(), Some(0));
}
