//! Runs the `recipebox` binary to check configuration handling.

use std::path::Path;
use std::process::{Command, Output};

/// Makes every configuration load fail validation.
const BROKEN_ENV: (&str, &str) = ("RECIPEBOX_RECIPES__ALL_LABEL", "Dessert");

fn recipebox(config: &Path, args: &[&str], broken_env: bool) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_recipebox"));
    cmd.arg("-c").arg(config).args(args).env_remove(BROKEN_ENV.0);
    if broken_env {
        cmd.env(BROKEN_ENV.0, BROKEN_ENV.1);
    }
    cmd.output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn config_path_runs_with_broken_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let output = recipebox(&config, &["config", "path"], true);

    assert!(output.status.success());
    assert!(stdout(&output).contains("config.toml"));
}

#[test]
fn config_validate_reports_broken_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let file = dir.path().join("other.toml");
    std::fs::write(&file, "[recipes]\nall_label = \"All\"\n").unwrap();

    let output = recipebox(
        &config,
        &["config", "validate", "--file", file.to_str().unwrap()],
        true,
    );

    assert!(output.status.success());
    assert!(stdout(&output).contains("Configuration error"));
}

#[test]
fn config_validate_accepts_valid_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(
        &file,
        "[storage]\nbackend = \"memory\"\n\n[recipes]\ncategories = [\"Soup\", \"Bread\"]\n",
    )
    .unwrap();

    let output = recipebox(&file, &["config", "validate"], false);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Configuration is valid."));
}

#[test]
fn store_commands_require_valid_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let output = recipebox(&config, &["categories"], true);

    assert!(!output.status.success());
}
