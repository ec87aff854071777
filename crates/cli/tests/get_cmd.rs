//! CLI tests for `at-parse get`.

use std::fs;
use std::process::{Command, Output};

use assert_cmd::cargo;

const QOS: &str =
    "+CGEQOSRDP: 0,0,,\r\n+CGEQOSRDP: 1,2,,\r\n+CGEQOSRDP: 2,4,,,1,65280000\r\nOK\r\n";

fn at_parse_cmd() -> Command {
    Command::new(cargo::cargo_bin!("at-parse"))
}

fn get(content: &str, args: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("modem.log");
    fs::write(&path, content).expect("write temp log");
    let path = path.to_string_lossy().to_string();
    at_parse_cmd()
        .arg("get")
        .arg(&path)
        .args(args)
        .output()
        .expect("run get command")
}

#[test]
fn int_on_later_line() {
    let output = get(QOS, &["--line", "2", "--index", "6", "--as", "int", "--output", "json"]);
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(v["line"], 2);
    assert_eq!(v["index"], 6);
    assert_eq!(v["value"], 65_280_000);
}

#[test]
fn string_defaults_to_first_line() {
    let output = get(
        "+CEREG: 2,\"76C1\",\"0102DA04\", 7\r\nOK\r\n",
        &["--index", "3", "--output", "pretty"],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0102DA04\n");
}

#[test]
fn negative_int() {
    let output = get("+NOTIF: 1,-2,3", &["--index", "2", "--as", "int", "--output", "pretty"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "-2\n");
}

#[test]
fn empty_subparameter_reports_no_data() {
    let output = get(QOS, &["--index", "3", "--as", "int"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AT1004"), "stderr={stderr}");
}

#[test]
fn line_past_final_response_is_unsupported() {
    let output = get(QOS, &["--line", "3", "--index", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AT1002"), "stderr={stderr}");
}

#[test]
fn int_as_string_is_unsupported() {
    let output = get(QOS, &["--index", "1", "--as", "str"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("AT1002"));
}

#[test]
fn int_above_i64_max_reads_as_unsigned() {
    let output = get(
        "+NOTIF: 18446744073709551615\r\nOK\r\n",
        &["--index", "1", "--as", "int", "--output", "json"],
    );
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(v["value"], u64::MAX);
}

#[test]
fn int_beyond_both_ranges_is_out_of_range() {
    for value in ["18446744073709551616", "-99999999999999999999"] {
        let output = get(&format!("+NOTIF: {value}"), &["--index", "1", "--as", "int"]);
        assert!(!output.status.success(), "{value}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("AT1003"), "stderr={stderr}");
    }
}
