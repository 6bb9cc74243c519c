//! Exit status of the `leaklens` binary on bad invocations

mod common;

use common::temp_path;
use std::process::{Command, Output};

fn leaklens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_leaklens"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run leaklens")
}

#[test]
fn test_missing_target_source_exits_non_zero() {
    let out = leaklens(&["--no-banner"]);
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--url"));
}

#[test]
fn test_url_and_list_together_exit_non_zero() {
    let out = leaklens(&["-u", "example.com", "-l", "targets.txt", "--no-banner"]);
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_unreadable_list_file_exits_non_zero() {
    let missing = temp_path("no-such-targets.txt");
    let out = leaklens(&["-l", missing.to_str().expect("utf-8 path"), "--no-banner"]);

    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&out.stdout).contains("Scanning"));
}

#[test]
fn test_list_without_usable_targets_exits_non_zero() {
    let list = temp_path("blank-targets.txt");
    std::fs::write(&list, "\n   \n\n").expect("write list");

    let out = leaklens(&["-l", list.to_str().expect("utf-8 path"), "--no-banner"]);
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(1));

    let _ = std::fs::remove_file(list);
}
