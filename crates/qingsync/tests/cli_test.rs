//! Black-box tests of the `qingsync` binary: argument parsing, help and
//! completion output, and failure exit codes. None of these need cloud
//! credentials.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

/// A `qingsync` invocation isolated from the host environment: config
/// lookups land in an empty sandbox directory and no `QINGPING_*`
/// variable leaks in from the developer's shell.
fn qingsync() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("qingsync");
    for var in [
        "QINGPING_APP_KEY",
        "QINGPING_APP_SECRET",
        "QINGPING_OUTPUT",
        "QINGPING_POLL_INTERVAL",
        "QINGPING_TIMEOUT",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("HOME", "/tmp/qingsync-test-sandbox")
        .env("XDG_CONFIG_HOME", "/tmp/qingsync-test-sandbox");
    cmd
}

fn stdout_and_stderr(output: &std::process::Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn bare_invocation_prints_usage() {
    let output = qingsync().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stdout_and_stderr(&output).contains("Usage"),
        "no usage text in:\n{}",
        stdout_and_stderr(&output)
    );
}

#[test]
fn help_lists_the_sync_commands() {
    qingsync().arg("--help").assert().success().stdout(
        predicate::str::contains("Qingping")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("readings"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn version_names_the_binary() {
    qingsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("qingsync"));
}

#[test]
fn completions_emit_bash_script() {
    qingsync()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn completions_emit_zsh_compdef() {
    qingsync()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn config_path_names_a_toml_file() {
    qingsync()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn missing_credentials_exit_with_auth_code() {
    let output = qingsync().arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(3), "want the auth exit code");
    assert!(
        stdout_and_stderr(&output).contains("credentials"),
        "no credentials hint in:\n{}",
        stdout_and_stderr(&output)
    );
}

#[test]
fn readings_demands_a_mac() {
    let output = qingsync().arg("readings").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "want the usage exit code");
}

#[test]
fn bogus_subcommand_is_a_usage_error() {
    let output = qingsync().arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn output_format_values_are_validated() {
    let output = qingsync()
        .args(["--output", "xml", "devices"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stdout_and_stderr(&output).contains("possible values"),
        "no value listing in:\n{}",
        stdout_and_stderr(&output)
    );
}
