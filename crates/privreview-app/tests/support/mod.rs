use std::fs;
use std::path::Path;

use privreview_app::{WalkAction, WalkRecord};

pub fn write_config(config_dir: &Path, raw: &str) {
    fs::create_dir_all(config_dir).expect("config dir");
    fs::write(config_dir.join("config.toml"), raw).expect("write config");
}

pub fn actions(raw: &[&str]) -> Vec<WalkAction> {
    raw.iter()
        .map(|value| value.parse().expect("walk action"))
        .collect()
}

pub fn positions(records: &[WalkRecord]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.position.as_str())
        .collect()
}
