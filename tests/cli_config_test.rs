//! Integration tests for configuration resolution and error reporting.

mod common;

use common::{TestEnv, parse_json};
use predicates::prelude::*;
use serde_json::Value;

fn config_show(cmd: &mut assert_cmd::Command) -> Value {
    let output = cmd
        .args(["config", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    parse_json(&output)
}

fn setting<'a>(json: &'a Value, key: &str) -> &'a Value {
    json["settings"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["key"] == key)
        .unwrap_or_else(|| panic!("no setting {}", key))
}

#[test]
fn test_defaults_without_any_config() {
    let env = TestEnv::new();
    let json = config_show(&mut env.wb());
    assert!(setting(&json, "endpoint")["value"].is_null());
    assert_eq!(setting(&json, "poll-interval-secs")["value"], "5");
    assert_eq!(setting(&json, "poll-interval-secs")["source"], "default");
    assert_eq!(setting(&json, "priority-field")["value"], "comp");
}

#[test]
fn test_project_file_supplies_values() {
    let env = TestEnv::new();
    env.write_project_config(
        "endpoint \"https://work.example.test/graphql\"\npage-size 25\ngraph \"g1\"\n",
    );
    let json = config_show(&mut env.wb());
    let endpoint = setting(&json, "endpoint");
    assert_eq!(endpoint["value"], "https://work.example.test/graphql");
    assert!(endpoint["source"].as_str().unwrap().starts_with("file:"));
    assert_eq!(setting(&json, "page-size")["value"], "25");
    assert_eq!(setting(&json, "graph")["value"], "g1");
}

#[test]
fn test_system_file_is_lowest_layer() {
    let env = TestEnv::new();
    env.write_system_config("graph \"from-system\"\nteam \"t-system\"\n");
    env.write_project_config("graph \"from-project\"\n");
    let json = config_show(&mut env.wb());
    assert_eq!(setting(&json, "graph")["value"], "from-project");
    assert_eq!(setting(&json, "team")["value"], "t-system");
    assert_eq!(setting(&json, "team")["source"], "system");
}

#[test]
fn test_env_beats_file_and_cli_beats_env() {
    let env = TestEnv::new();
    env.write_project_config("endpoint \"https://file.example.test/graphql\"\n");

    let json = config_show(
        env.wb()
            .env("WB_ENDPOINT", "https://env.example.test/graphql"),
    );
    assert_eq!(setting(&json, "endpoint")["value"], "https://env.example.test/graphql");
    assert_eq!(setting(&json, "endpoint")["source"], "env:WB_ENDPOINT");

    let json = config_show(
        env.wb()
            .env("WB_ENDPOINT", "https://env.example.test/graphql")
            .args(["--endpoint", "https://cli.example.test/graphql"]),
    );
    assert_eq!(setting(&json, "endpoint")["value"], "https://cli.example.test/graphql");
    assert_eq!(setting(&json, "endpoint")["source"], "cli");
}

#[test]
fn test_token_is_masked() {
    let env = TestEnv::new();
    let json = config_show(env.wb().env("WB_TOKEN", "supersecrettoken123"));
    let token = setting(&json, "token")["value"].as_str().unwrap();
    assert!(!token.contains("supersecrettoken123"));
    assert_eq!(setting(&json, "token")["source"], "env:WB_TOKEN");
}

#[test]
fn test_explicit_config_replaces_project_file() {
    let env = TestEnv::new();
    env.write_project_config("team \"project-team\"\n");
    let explicit = env.path().join("other.kdl");
    std::fs::write(&explicit, "team \"explicit-team\"\n").unwrap();

    let json = config_show(env.wb().arg("--config").arg(&explicit));
    assert_eq!(setting(&json, "team")["value"], "explicit-team");
}

#[test]
fn test_missing_explicit_config_fails() {
    let env = TestEnv::new();
    env.wb()
        .args(["--config", "nope.kdl", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_config_value_fails() {
    let env = TestEnv::new();
    env.write_project_config("page-size 0\n");
    env.wb()
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page-size"));
}

#[test]
fn test_malformed_kdl_fails() {
    let env = TestEnv::new();
    env.write_project_config("endpoint \"unterminated\n");
    env.wb().args(["config", "show"]).assert().failure();
}

#[test]
fn test_output_format_from_config() {
    let env = TestEnv::with_sample();
    env.write_project_config("output-format \"human\"\n");
    env.wb_sample()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("By status:"));
}

#[test]
fn test_priority_field_from_config_changes_buckets() {
    let env = TestEnv::new();
    env.write_snapshot(
        r#"[{"id":"a","title":"A","createdAt":"2026-01-01T00:00:00Z","priorityComp":0.1,"priorityExec":0.9}]"#,
    );
    env.write_project_config("priority-field \"exec\"\n");
    let output = env
        .wb_sample()
        .args(["items"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(parse_json(&output)["rows"][0]["priority"], "critical");
}

// === errors ===

#[test]
fn test_no_source_is_config_error() {
    let env = TestEnv::new();
    let output = env
        .wb()
        .arg("stats")
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let json = parse_json(&output);
    assert!(json["error"].as_str().unwrap().contains("no endpoint configured"));
}

#[test]
fn test_human_errors_are_plain_text() {
    let env = TestEnv::new();
    env.wb()
        .args(["stats", "-H"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn test_missing_snapshot_is_io_error() {
    let env = TestEnv::new();
    env.wb()
        .args(["--input", "missing.json", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_unreachable_endpoint_is_http_error() {
    let env = TestEnv::new();
    env.write_project_config("request-timeout-secs 2\n");
    env.wb()
        .args(["--endpoint", "http://127.0.0.1:9/graphql", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP error"));
}

#[test]
fn test_snapshot_overrides_endpoint() {
    let env = TestEnv::with_sample();
    env.write_project_config("endpoint \"http://127.0.0.1:9/graphql\"\n");
    env.wb_sample().arg("stats").assert().success();
}
