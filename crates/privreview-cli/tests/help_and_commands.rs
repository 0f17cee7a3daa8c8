mod support;

use predicates::prelude::*;
use std::fs;

use support::{
    assert_timestamp_log_names, command_in_home, config_dir, new_command_with_temp_home,
    read_state, write_config,
};

#[test]
fn root_help_lists_commands() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: privreview"))
        .stdout(predicate::str::contains("--diagnostics"))
        .stdout(predicate::str::contains("--step"))
        .stdout(predicate::str::contains("doctor"))
        .stdout(predicate::str::contains("steps"))
        .stdout(predicate::str::contains("walk"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn doctor_runs_without_config() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("step registry validates"))
        .stdout(predicate::str::contains("4 passed, 0 failed"));
}

#[test]
fn doctor_reports_invalid_config_without_failing() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_config(temp_home.path(), "version = 2\n");

    command
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("1 failed"));
}

#[test]
fn walk_prints_each_position_and_persists_progress() {
    let (mut command, temp_home) = new_command_with_temp_home();
    command
        .args(["walk", "next", "next", "next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("clearOnExit"))
        .stdout(predicate::str::contains("Step 3 of 3"))
        .stdout(predicate::str::contains("step=cookies"));

    let state = read_state(temp_home.path());
    assert!(state.contains("show_welcome_card = false"), "{state}");
    assert!(state.contains("step=cookies"), "{state}");

    command_in_home(temp_home.path())
        .args(["walk", "back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cookies"))
        .stdout(predicate::str::contains("exited (back-at-root)"));
}

#[test]
fn walk_honors_step_flag() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .args(["--step", "cookies", "walk", "next", "next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completion"))
        .stdout(predicate::str::contains("exited (completed)"));
}

#[test]
fn walk_rejects_unknown_action() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .args(["walk", "jump"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown walk action 'jump'"));
}

#[test]
fn walk_reports_unknown_goto_target() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .args(["walk", "goto:nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("walk action 'goto:nowhere' failed"))
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn walk_fails_with_invalid_config() {
    let (mut command, temp_home) = new_command_with_temp_home();
    write_config(temp_home.path(), "version = [");

    command
        .args(["walk", "next"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config at"))
        .stderr(predicate::str::contains("privreview doctor"));
}

#[test]
fn steps_reflects_signal_overrides() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .args(["steps", "--sync", "on", "--cookies", "allow-all"])
        .assert()
        .success()
        .stdout(
            predicate::str::is_match(r"historySync\s+\S\s+setting\s+\S\s+yes\s+\S\s+yes")
                .expect("regex"),
        )
        .stdout(
            predicate::str::is_match(r"cookies\s+\S\s+setting\s+\S\s+yes\s+\S\s+no")
                .expect("regex"),
        )
        .stdout(predicate::str::contains("sync on, cookies allow-all"));
}

#[test]
fn steps_rejects_unknown_cookie_setting() {
    let (mut command, _temp_home) = new_command_with_temp_home();
    command
        .args(["steps", "--cookies", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown cookie setting 'sometimes'"));
}

#[test]
fn reset_restores_welcome_card() {
    let (mut command, temp_home) = new_command_with_temp_home();
    command.args(["walk", "next"]).assert().success();

    command_in_home(temp_home.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("welcome card shown"));

    let state = read_state(temp_home.path());
    assert!(state.contains("show_welcome_card = true"), "{state}");
    assert!(!state.contains("step="), "{state}");

    command_in_home(temp_home.path())
        .args(["walk", "back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("welcome"));
}

#[test]
fn diagnostics_flag_writes_timestamped_log() {
    let (mut command, temp_home) = new_command_with_temp_home();
    command
        .args(["--diagnostics", "doctor"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Diagnostics enabled:"));

    let diagnostics_dir = config_dir(temp_home.path()).join("diagnostics");
    let logs: Vec<_> = fs::read_dir(&diagnostics_dir)
        .expect("diagnostics dir")
        .filter_map(Result::ok)
        .collect();
    assert_timestamp_log_names(&logs);
}
