//! Integration tests for the `callback` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to run the today, check,
//! window and schedule subcommands through the actual binary, with the clock
//! pinned by `--now`.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the rules.json fixture (reference hours, 90-minute lead).
fn rules_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/rules.json")
}

/// Helper: path to the bank-holidays.json fixture.
fn bank_holidays_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/bank-holidays.json")
}

/// Helper: path to a rules file with an override on a holiday.
fn overlap_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/overlap.json")
}

fn callback() -> Command {
    Command::cargo_bin("callback").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// today
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn today_next_slot_is_available() {
    callback()
        .args(["today", "--time", "10:00", "--now", "2014-11-24T09:30"])
        .assert()
        .success()
        .stdout("available\n");
}

#[test]
fn today_current_slot_is_unavailable() {
    callback()
        .args(["today", "--time", "09:30", "--now", "2014-11-24T09:30"])
        .assert()
        .success()
        .stdout("unavailable\n");
}

#[test]
fn today_respects_configured_lead_time() {
    callback()
        .args(["today", "-t", "11:00", "--now", "2014-11-24T09:30", "-c", rules_path()])
        .assert()
        .success()
        .stdout("unavailable\n");

    callback()
        .args(["today", "-t", "11:30", "--now", "2014-11-24T09:30", "-c", rules_path()])
        .assert()
        .success()
        .stdout("available\n");
}

#[test]
fn today_rejects_malformed_time() {
    callback()
        .args(["today", "--time", "half past nine", "--now", "2014-11-24T09:30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time"));
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_monday_morning_during_weekend() {
    callback()
        .args(["check", "--date", "2015-02-09", "--time", "09:00", "--now", "2015-02-07T09:00"])
        .assert()
        .success()
        .stdout("unavailable\n");

    callback()
        .args(["check", "--date", "2015-02-09", "--time", "11:00", "--now", "2015-02-07T09:00"])
        .assert()
        .success()
        .stdout("available\n");
}

#[test]
fn check_accepts_form_date_keys() {
    callback()
        .args(["check", "-d", "20141125", "-t", "09:00", "--now", "2014-11-24T09:30"])
        .assert()
        .success()
        .stdout("available\n");
}

#[test]
fn check_sunday_is_unavailable() {
    callback()
        .args(["check", "-d", "2014-11-30", "-t", "09:00", "--now", "2014-11-24T09:30"])
        .assert()
        .success()
        .stdout("unavailable\n");
}

#[test]
fn check_rejects_malformed_now() {
    callback()
        .args(["check", "-d", "2014-11-25", "-t", "09:00", "--now", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

// ─────────────────────────────────────────────────────────────────────────────
// window
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn window_after_hours_friday() {
    let output = callback()
        .args(["window", "--now", "2015-02-13T21:00"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let choices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let obj = choices.as_object().unwrap();
    let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["20150214", "20150216", "20150217", "20150218", "20150219", "20150220"]
    );
    assert_eq!(obj["20150214"].as_array().unwrap().len(), 7);
    assert_eq!(obj["20150216"].as_array().unwrap().len(), 18);
    assert_eq!(obj["20150217"].as_array().unwrap().len(), 22);
    assert_eq!(obj["20150216"][0], "1100");
}

#[test]
fn window_days_limits_dates() {
    let output = callback()
        .args(["window", "--days", "2", "--now", "2015-02-13T21:00"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let choices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(choices.as_object().unwrap().len(), 2);
}

#[test]
fn window_skips_bank_holidays() {
    let output = callback()
        .args([
            "window",
            "--now",
            "2014-12-23T21:00",
            "--holidays",
            bank_holidays_path(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let choices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let obj = choices.as_object().unwrap();
    assert!(obj.contains_key("20141224"));
    assert!(!obj.contains_key("20141225"));
    assert!(!obj.contains_key("20141226"));
    assert!(obj.contains_key("20141227"));
}

// ─────────────────────────────────────────────────────────────────────────────
// schedule
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn schedule_shows_override_hours() {
    callback()
        .args(["schedule", "--date", "2014-12-24", "--now", "2014-12-01T09:00"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2014-12-24 09:00-18:30\n09:00 09:30"))
        .stdout(predicate::str::contains("18:00\n"));
}

#[test]
fn schedule_shows_closed_day() {
    callback()
        .args(["schedule", "--date", "2015-02-15", "--now", "2015-02-01T09:00"])
        .assert()
        .success()
        .stdout("2015-02-15 closed\n");
}

#[test]
fn schedule_applies_bank_holidays() {
    callback()
        .args(["schedule", "-d", "2014-12-26", "--now", "2014-12-01T09:00"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2014-12-26 09:00-20:00"));

    callback()
        .args([
            "schedule",
            "-d",
            "2014-12-26",
            "--now",
            "2014-12-01T09:00",
            "--holidays",
            bank_holidays_path(),
        ])
        .assert()
        .success()
        .stdout("2014-12-26 closed\n");
}

#[test]
fn schedule_uses_division() {
    callback()
        .args([
            "schedule",
            "-d",
            "2015-01-02",
            "--now",
            "2014-12-01T09:00",
            "--holidays",
            bank_holidays_path(),
            "--division",
            "scotland",
        ])
        .assert()
        .success()
        .stdout("2015-01-02 closed\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn override_on_holiday_fails_at_startup() {
    callback()
        .args(["window", "--now", "2014-12-01T09:00", "-c", overlap_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("falls on a configured holiday"));
}

#[test]
fn unknown_division_fails() {
    callback()
        .args([
            "window",
            "--now",
            "2014-12-01T09:00",
            "--holidays",
            bank_holidays_path(),
            "--division",
            "atlantis",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("atlantis"));
}

#[test]
fn missing_config_file_fails() {
    callback()
        .args(["window", "-c", "/nonexistent/rules.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn no_subcommand_shows_usage() {
    callback()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
