mod cli_helpers;

use assert_cmd::prelude::*;
use cli_helpers::{base_cmd, fixture, report_cmd, setup_temp_home};
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn report_table_no_color() {
    let home = setup_temp_home();

    let mut cmd = report_cmd(&home);
    cmd.arg("--no-color");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Security Performance"))
        .stdout(predicate::str::contains("ACME"))
        .stdout(predicate::str::contains("221.00"))
        .stdout(predicate::str::contains("Quarterly"))
        .stdout(predicate::str::contains("BROKEN"))
        .stdout(predicate::str::contains("oversold"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn report_json_lists_records_and_errors() {
    let home = setup_temp_home();

    let output = report_cmd(&home).arg("--json").output().unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let acme = &entries[0]["record"];
    assert_eq!(entries[0]["security"], "ACME");
    assert_eq!(acme["delta"], "221.00");
    assert_eq!(acme["shares_held"], "6");
    assert_eq!(acme["fifo_cost"], "609.00");
    assert_eq!(acme["net_fifo_cost"], "600.00");
    assert_eq!(acme["realized_gain"], "74.00");
    assert_eq!(acme["sum_of_dividends"], "36.00");
    assert_eq!(acme["dividend_event_count"], 3);
    assert_eq!(acme["periodicity"], "Quarterly");
    assert!(acme["irr"].as_f64().unwrap() > 0.0);

    // USD converted at 0.90 on purchase and 0.92 on valuation
    let globex = &entries[1]["record"];
    assert_eq!(globex["currency"], "EUR");
    assert_eq!(globex["delta"], "56.00");

    assert_eq!(entries[2]["security"], "BROKEN");
    assert!(entries[2]["error"].as_str().unwrap().contains("oversold"));
}

#[test]
fn report_single_security() {
    let home = setup_temp_home();

    let output = report_cmd(&home)
        .args(["--security", "GLOBEX", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["security"], "GLOBEX");
}

#[test]
fn report_period_opens_holdings_bought_earlier() {
    let home = setup_temp_home();

    // GLOBEX was bought in February; only its valuation falls into December
    let output = report_cmd(&home)
        .args(["--period", "2024-12-01:2024-12-31", "--security", "GLOBEX", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    let globex = &value[0]["record"];
    assert!(value[0]["error"].is_null());
    assert_eq!(globex["shares_held"], "5");
    // opened at the purchase cost of 500.00 USD at 0.90
    assert_eq!(globex["fifo_cost"], "450.00");
    assert_eq!(globex["delta"], "56.00");
    assert!(globex["irr"].as_f64().unwrap() > 0.0);
}

#[test]
fn report_second_half_year_carries_the_position() {
    let home = setup_temp_home();

    let output = report_cmd(&home)
        .args(["--period", "2024-07-01:2024-12-31", "--security", "ACME", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    let acme = &value[0]["record"];
    // 720 + 480 + 12 - 1015 opening cost
    assert_eq!(acme["delta"], "197.00");
    assert_eq!(acme["fifo_cost"], "609.00");
    assert_eq!(acme["realized_gain"], "74.00");
    assert_eq!(acme["sum_of_dividends"], "12.00");
    assert_eq!(acme["dividend_event_count"], 1);
}

#[test]
fn missing_transactions_file_fails() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.arg("report")
        .arg("--transactions")
        .arg(fixture("does_not_exist.csv"))
        .arg("--curves")
        .arg(fixture("curves.csv"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read transactions"));
}

#[test]
fn invalid_period_fails() {
    let home = setup_temp_home();

    report_cmd(&home)
        .args(["--period", "last-week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid period"));
}

#[test]
fn config_file_sets_reporting_currency() {
    let home = setup_temp_home();
    let config_path = home.path().join("secperf.toml");
    std::fs::write(&config_path, "reporting_currency = \"USD\"\n").unwrap();

    // rates are quoted in EUR per USD, so the EUR security cannot be converted
    let output = report_cmd(&home)
        .arg("--config")
        .arg(&config_path)
        .args(["--security", "ACME", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value[0]["error"]
        .as_str()
        .unwrap()
        .contains("no exchange rate for EUR"));
}
