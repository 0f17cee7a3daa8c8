use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub fn new_command_with_temp_home() -> (Command, tempfile::TempDir) {
    let temp_home = tempfile::tempdir().expect("temp home");
    let command = command_in_home(temp_home.path());
    (command, temp_home)
}

pub fn command_in_home(home: &Path) -> Command {
    let binary = assert_cmd::cargo::cargo_bin!("privreview");
    let mut command = Command::new(binary);
    command.env("HOME", home);
    command.env("XDG_CONFIG_HOME", home.join(".config"));
    command.env_remove("RUST_LOG");
    command
}

pub fn config_dir(home: &Path) -> PathBuf {
    home.join(".config").join("privreview")
}

pub fn write_config(home: &Path, raw: &str) {
    let config_dir = config_dir(home);
    fs::create_dir_all(&config_dir).expect("create config dir");
    fs::write(config_dir.join("config.toml"), raw).expect("write config");
}

pub fn read_state(home: &Path) -> String {
    fs::read_to_string(config_dir(home).join("state.toml")).expect("read state")
}

pub fn assert_timestamp_log_names(entries: &[std::fs::DirEntry]) {
    assert!(!entries.is_empty(), "expected at least one diagnostics log");

    for entry in entries {
        let name = entry
            .file_name()
            .into_string()
            .expect("diagnostics filename utf8");
        let stem = name
            .strip_suffix(".log")
            .expect("diagnostics filename .log suffix");
        assert!(
            !stem.is_empty() && stem.chars().all(|character| character.is_ascii_digit()),
            "diagnostics filename must be <epoch-ms>.log, got: {name}"
        );
    }
}
