#![allow(dead_code)]

use assert_cmd::cargo;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

pub fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from("tests/data").join(name)
}

/// Command with an isolated HOME so no user configuration is picked up
pub fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("secperf"));
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

/// `report` over the bundled fixtures, reference date 2024-12-31
pub fn report_cmd(home: &TempDir) -> Command {
    let mut cmd = base_cmd(home);
    cmd.arg("report")
        .arg("--transactions")
        .arg(fixture("transactions.csv"))
        .arg("--curves")
        .arg(fixture("curves.csv"))
        .arg("--rates")
        .arg(fixture("rates.csv"))
        .arg("--today")
        .arg("2024-12-31");
    cmd
}
