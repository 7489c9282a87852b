//! Integration tests for finchctl
//!
//! These run the built binary. Only paths that fail or finish before a robot
//! is needed are exercised here, so no hardware is required.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn finchctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("finchctl")?;
    cmd.env_remove("FINCH_VENDOR_ID")
        .env_remove("FINCH_PRODUCT_ID")
        .env_remove("FINCH_READ_TIMEOUT_MS")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn help_lists_subcommands() -> TestResult {
    finchctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("led"))
        .stdout(predicate::str::contains("drive"))
        .stdout(predicate::str::contains("read"));
    Ok(())
}

#[test]
fn out_of_range_led_exits_with_validation_code() -> TestResult {
    finchctl()?
        .args(["led", "300", "0", "0"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("red value 300 is out of range [0, 255]"));
    Ok(())
}

#[test]
fn negative_led_value_is_validated_not_parsed_as_flag() -> TestResult {
    finchctl()?.args(["led", "-10", "0", "0"]).assert().code(4);
    Ok(())
}

#[test]
fn bad_direction_exits_with_validation_code() -> TestResult {
    finchctl()?
        .args(["drive", "2", "0", "0", "0"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("left_direction"));
    Ok(())
}

#[test]
fn out_of_range_buzz_reports_json_error() -> TestResult {
    let output = finchctl()?
        .args(["--json", "buzz", "65536", "440"])
        .assert()
        .code(4)
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(value["success"], Value::Bool(false));
    assert!(
        value["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("duration_ms"))
    );
    Ok(())
}

#[test]
fn zero_timeout_is_a_configuration_error() -> TestResult {
    finchctl()?
        .args(["--timeout-ms", "0", "read", "temperature"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("greater than zero"));
    Ok(())
}

#[test]
fn invalid_env_id_is_a_configuration_error() -> TestResult {
    finchctl()?
        .env("FINCH_VENDOR_ID", "not-an-id")
        .arg("stop")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("FINCH_VENDOR_ID"));
    Ok(())
}

#[test]
fn unknown_sensor_is_a_usage_error() -> TestResult {
    finchctl()?
        .args(["read", "humidity"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
    Ok(())
}

#[test]
fn completion_generates_script() -> TestResult {
    finchctl()?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("finchctl"));
    Ok(())
}
