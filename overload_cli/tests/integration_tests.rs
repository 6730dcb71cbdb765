//! Integration tests for the overload binary.
//!
//! These tests verify end-to-end behavior including:
//! - Program creation and validation
//! - Workout and test completion through the file store
//! - Skips, history, deactivation and export
//! - Error exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI bound to a data directory and owner, isolated from the user's config
fn cli(data_dir: &Path, owner: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("overload"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--owner")
        .arg(owner);
    cmd
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

fn create_program(data_dir: &Path, method: &str, test_max: u32) -> Value {
    json_output(
        cli(data_dir, "ana")
            .arg("create")
            .arg("--exercise")
            .arg("pushups")
            .arg("--method")
            .arg(method)
            .arg("--test-max")
            .arg(test_max.to_string())
            .arg("--days-per-week")
            .arg("3")
            .arg("--days")
            .arg("mon,wed,fri")
            .arg("--json"),
    )
}

fn program_days(data_dir: &Path, program_id: &str) -> Vec<Value> {
    let view = json_output(cli(data_dir, "ana").arg("show").arg(program_id).arg("--json"));
    view["days"].as_array().expect("days array").clone()
}

fn first_day_of_type(data_dir: &Path, program_id: &str, day_type: &str) -> String {
    program_days(data_dir, program_id)
        .iter()
        .find(|d| d["day_type"] == day_type)
        .and_then(|d| d["id"].as_str())
        .expect("day of requested type")
        .to_string()
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("overload"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Progressive overload training scheduler",
        ));
}

#[test]
fn test_create_generates_four_weeks() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "submax", 12);
    assert_eq!(created["days_generated"], 28);
    assert_eq!(created["program"]["state"]["work_reps"], 8);
    assert_eq!(created["program"]["active"], true);

    let program_id = created["program"]["id"].as_str().unwrap();
    assert!(data_dir
        .join("programs")
        .join(format!("{}.json", program_id))
        .exists());

    let days = program_days(data_dir, program_id);
    assert_eq!(days.len(), 28);
    assert_eq!(days.iter().filter(|d| d["day_type"] == "test").count(), 1);
}

#[test]
fn test_create_rejects_duplicate_days() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "ana")
        .args(["create", "--exercise", "pullups", "--method", "ladder"])
        .args(["--test-max", "10", "--days-per-week", "3", "--days", "mon,mon,fri"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("more than once"));

    cli(temp_dir.path(), "ana")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No programs yet"));
}

#[test]
fn test_create_rejects_unknown_exercise() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "ana")
        .args(["create", "--exercise", "squats", "--method", "submax"])
        .args(["--test-max", "10", "--days-per-week", "3", "--days", "mon,wed,fri"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown exercise"));
}

#[test]
fn test_submax_workout_cycle() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "submax", 12);
    let program_id = created["program"]["id"].as_str().unwrap();
    let day_id = first_day_of_type(data_dir, program_id, "workout");

    let outcome = json_output(
        cli(data_dir, "ana")
            .args(["done", day_id.as_str(), "--reps", "8,8,8,7,7", "--json"]),
    );
    assert_eq!(outcome["previous_state"]["work_reps"], 8);
    assert_eq!(outcome["state"]["work_reps"], 9);

    // Second completion of the same day is a state conflict
    cli(data_dir, "ana")
        .args(["done", day_id.as_str(), "--reps", "8,8,8,8,8"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("already done"));

    let list = json_output(cli(data_dir, "ana").args(["list", "--json"]));
    assert_eq!(list[0]["state"]["work_reps"], 9);
}

#[test]
fn test_ladder_workout_cycle() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "ladder", 8);
    assert_eq!(created["program"]["state"]["top"], 5);
    let program_id = created["program"]["id"].as_str().unwrap();
    let day_id = first_day_of_type(data_dir, program_id, "workout");

    let outcome = json_output(
        cli(data_dir, "ana")
            .args(["done", day_id.as_str(), "--steps", "1,2,3,4,5", "--json"]),
    );
    assert_eq!(outcome["state"]["top"], 6);
}

#[test]
fn test_wrong_result_kind_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "ladder", 8);
    let program_id = created["program"]["id"].as_str().unwrap();
    let day_id = first_day_of_type(data_dir, program_id, "workout");

    cli(data_dir, "ana")
        .args(["done", day_id.as_str(), "--reps", "5,5,5"])
        .assert()
        .code(2);
}

#[test]
fn test_test_day_rebases_program() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "submax", 12);
    let program_id = created["program"]["id"].as_str().unwrap();
    let test_day = first_day_of_type(data_dir, program_id, "test");

    let outcome = json_output(
        cli(data_dir, "ana").args(["test", test_day.as_str(), "--max", "20", "--json"]),
    );
    assert_eq!(outcome["test_max"], 20);
    assert_eq!(outcome["state"]["work_reps"], 14);
    assert_eq!(outcome["days_generated"], 28);

    let days = program_days(data_dir, program_id);
    assert_eq!(days.len(), 56);
    assert_eq!(days.iter().filter(|d| d["day_type"] == "test").count(), 2);
}

#[test]
fn test_skip_and_history() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "submax", 12);
    let program_id = created["program"]["id"].as_str().unwrap();
    let day_id = first_day_of_type(data_dir, program_id, "workout");

    cli(data_dir, "ana")
        .args(["skip", day_id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped"));

    cli(data_dir, "ana")
        .args(["history", program_id])
        .assert()
        .success()
        .stdout(predicate::str::contains(day_id.as_str()));

    cli(data_dir, "ana")
        .args(["skip", day_id.as_str()])
        .assert()
        .code(3);
}

#[test]
fn test_deactivate_hides_program_from_today() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "submax", 12);
    let program_id = created["program"]["id"].as_str().unwrap();

    let today = json_output(cli(data_dir, "ana").args(["today", "--json"]));
    assert_eq!(today["program"]["id"], program_id);

    cli(data_dir, "ana")
        .args(["deactivate", program_id])
        .assert()
        .success();

    let today = json_output(cli(data_dir, "ana").args(["today", "--json"]));
    assert!(today.is_null());

    let list = json_output(cli(data_dir, "ana").args(["list", "--json"]));
    assert_eq!(list[0]["active"], false);
    assert_eq!(program_days(data_dir, program_id).len(), 28);
}

#[test]
fn test_export_to_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "ladder", 10);
    let program_id = created["program"]["id"].as_str().unwrap();
    let out = data_dir.join("export.csv");

    cli(data_dir, "ana")
        .arg("export")
        .arg(program_id)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 28 days"));

    let csv = fs::read_to_string(&out).expect("Failed to read CSV");
    assert!(csv.starts_with("day_id,date,day_type,status"));
    assert_eq!(csv.lines().count(), 29);
}

#[test]
fn test_other_owner_cannot_touch_program() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let created = create_program(data_dir, "submax", 12);
    let program_id = created["program"]["id"].as_str().unwrap();
    let day_id = first_day_of_type(data_dir, program_id, "workout");

    cli(data_dir, "ben")
        .args(["show", program_id])
        .assert()
        .code(3);
    cli(data_dir, "ben")
        .args(["done", day_id.as_str(), "--reps", "8,8,8,8,8"])
        .assert()
        .code(3);

    let today = json_output(cli(data_dir, "ben").args(["today", "--json"]));
    assert!(today.is_null());
}

#[test]
fn test_default_command_is_today() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path(), "ana")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing scheduled today"));
}
