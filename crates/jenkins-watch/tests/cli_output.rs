//! Integration tests for CLI argument and configuration handling.
//!
//! Every case fails before any network I/O, so no Jenkins server (or curl)
//! is needed. HOME and the working directory point at a temp dir so the
//! developer's own config files never leak in.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jenkins-watch"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("NO_COLOR", "1")
        .env_remove("JENKINS_WATCH_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute 'jenkins-watch'")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("watch"));
    assert!(stdout.contains("status"));
}

#[test]
fn test_no_subcommand_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &[]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_server_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["status"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(stderr.contains("Invalid configuration"), "stderr: {}", stderr);
    assert!(stderr.contains("server.url"), "stderr: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unsupported_scheme_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["watch", "--server", "ftp://ci.example.com"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unsupported scheme 'ftp'"));
}

#[test]
fn test_timeout_longer_than_interval_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(
        dir.path(),
        &[
            "watch",
            "--server",
            "https://ci.example.com",
            "--interval",
            "10",
            "--timeout",
            "20",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("must not exceed poll interval"));
}

#[test]
fn test_zero_interval_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(
        dir.path(),
        &["watch", "--server", "https://ci.example.com", "--interval", "0"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid polling interval"));
}

#[test]
fn test_project_config_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join(".jenkins-watch");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[server]\nurl = \"gopher://ci.example.com\"\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["status"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("gopher://ci.example.com"));
}

#[test]
fn test_cli_server_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join(".jenkins-watch");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[server]\nurl = \"https://ci.example.com\"\n\n[polling]\ninterval_secs = 5\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["watch", "--server", "ftp://override"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ftp://override"));
}

#[test]
fn test_malformed_config_falls_back_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join(".jenkins-watch");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[server\nurl = ").unwrap();

    let output = run_in(dir.path(), &["status"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr(&output);
    assert!(stderr.contains("Could not load config"), "stderr: {}", stderr);
    assert!(stderr.contains("Invalid configuration"), "stderr: {}", stderr);
}
