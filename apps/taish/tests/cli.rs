// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Exercise the taish binary in batch, script and interactive modes.
// Author: Lukas Bower

use std::fs;
use std::time::Duration;

fn taish() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo_bin_cmd!("taish");
    cmd.env("RUST_LOG", "warn")
        .env_remove("TAISH_CONFIG")
        .env_remove("TAISH_FIXTURE")
        .env_remove("TAISH_HISTORY")
        .timeout(Duration::from_secs(5));
    cmd
}

#[test]
fn command_string_runs_each_command() {
    let assert = taish()
        .arg("-c")
        .arg("module 1; netif 0; set tx-enable false; get tx-enable")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert_eq!(stdout, "false\n");
}

#[test]
fn json_flag_encodes_values() {
    let assert = taish()
        .args(["--json", "-c", "module 1; netif 0; get modulation-format"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert_eq!(stdout, "\"dp-qpsk\"\n");
}

#[test]
fn list_reports_every_slot() {
    let assert = taish().args(["-c", "list"]).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.starts_with("module: 1 0x00000001\n"), "{stdout:?}");
    assert!(stdout.contains("module: 3 not present"), "{stdout:?}");
}

#[test]
fn script_file_stops_at_root_quit() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("session.taish");
    fs::write(
        &script,
        "# inspect the first host interface\nmodule 1\nhostif 1\nget fec\nquit\nquit\nquit\nlist\n",
    )
    .unwrap();
    let assert = taish().arg("--script").arg(&script).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert_eq!(stdout, "rs\n");
}

#[test]
fn fixture_seeds_the_daemon() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = dir.path().join("fixture.toml");
    fs::write(
        &fixture,
        r#"
[[module]]
location = "slot-a"
netifs = 0
hostifs = 1

[[module]]
location = "slot-b"
created = false
"#,
    )
    .unwrap();
    let assert = taish()
        .arg("--fixture")
        .arg(&fixture)
        .args(["-c", "list; module slot-b; module slot-a; hostif 0; get fec-type"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert_eq!(
        stdout,
        "module: slot-a 0x00000001\n hostif: 0 0x00000002\nmodule: slot-b not present\nerr: module slot-b not created yet\nrs\n"
    );
}

#[test]
fn config_file_enables_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("taish.toml");
    fs::write(&config, "json = true\n").unwrap();
    let assert = taish()
        .arg("--config")
        .arg(&config)
        .args(["-c", "module 1; get temp"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert_eq!(stdout, "38.5\n");
}

#[test]
fn unknown_config_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("taish.toml");
    fs::write(&config, "port = 50051\n").unwrap();
    taish()
        .arg("--config")
        .arg(&config)
        .args(["-c", "list"])
        .assert()
        .failure();
}

#[test]
fn interactive_quit_exits_cleanly() {
    let assert = taish().write_stdin("module 1\nquit\nquit\n").assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(!stderr.contains("error"), "unexpected stderr output: {stderr:?}");
}
