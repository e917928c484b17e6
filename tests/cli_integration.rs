//! CLI integration tests
//!
//! These run the built binary and check parsing, output formats, and exit
//! codes.

mod support;

use std::fs;
use std::process::{Command, Output};
use support::{fixture_path, get_triagebox_binary};
use tempfile::TempDir;

fn triagebox(args: &[&str]) -> Output {
    Command::new(get_triagebox_binary())
        .args(args)
        .env_remove("TRIAGEBOX_DEDUP_POLICY")
        .env_remove("TRIAGEBOX_AUDIT_FILE")
        .output()
        .expect("Failed to execute triagebox")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON")
}

#[test]
fn test_cli_help() {
    let output = triagebox(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("triagebox"));
    for command in ["triage", "batch", "demo", "show", "catalog"] {
        assert!(stdout.contains(command), "help lacks {}", command);
    }
}

#[test]
fn test_cli_version() {
    let output = triagebox(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_catalog_json_is_sorted() {
    let output = triagebox(&["catalog", "--format", "json"]);
    assert!(output.status.success());

    let value = stdout_json(&output);
    let kinds: Vec<&str> = value["action_kinds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(kinds.len(), 7);
    assert!(kinds.windows(2).all(|w| w[0] <= w[1]));
    assert!(value["categories"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "Backup Integrity Failure"));
}

#[test]
fn test_demo_json_numbers_runs() {
    let output = triagebox(&["demo", "-f", "json", "--flow"]);
    assert!(output.status.success());

    let value = stdout_json(&output);
    let runs = value["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 16);
    assert_eq!(runs[0]["id"], "run-0000");
    assert_eq!(runs[15]["id"], "run-0015");

    let flow = value["flow_log"].as_array().unwrap();
    assert_eq!(flow[0], "Starting new triage batch of 16 run(s)...");
}

#[test]
fn test_triage_log_file() {
    let log = fixture_path("logs/ansible_deploy.log");
    let output = triagebox(&[
        "triage",
        log.to_str().unwrap(),
        "--test-name",
        "test_ansible_role_deploy",
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let value = stdout_json(&output);
    let run = &value["runs"][0];
    assert_eq!(run["test_name"], "test_ansible_role_deploy");
    assert_eq!(run["failed_step"], "Running deployment playbook");
    assert_eq!(
        run["analysis"]["classifications"][0]["classification_type"],
        "Ansible Deploy Failure"
    );
    assert_eq!(
        run["analysis"]["action_results"][0]["message_sent_to"],
        "#devops-ansible"
    );
}

#[test]
fn test_triage_defaults_test_name_to_file_stem() {
    let log = fixture_path("logs/no_markers.log");
    let output = triagebox(&["triage", log.to_str().unwrap(), "-f", "json"]);
    assert!(output.status.success());

    let value = stdout_json(&output);
    let run = &value["runs"][0];
    assert_eq!(run["test_name"], "no_markers");
    assert_eq!(run["failed_step"], "Log analysis did not find a failed step");
    assert_eq!(
        run["analysis"]["classifications"][0]["classification_type"],
        "Needs Manual Review"
    );
}

#[test]
fn test_triage_missing_file_fails() {
    let output = triagebox(&["triage", "/definitely/not/here.log"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read"));
}

#[test]
fn test_batch_json_keeps_ids() {
    let batch = fixture_path("batch.json");
    let output = triagebox(&["batch", batch.to_str().unwrap(), "-f", "json"]);
    assert!(output.status.success());

    let value = stdout_json(&output);
    let runs = value["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0]["id"], "nightly-1");
    assert_eq!(runs[1]["id"], "run-0000");

    let perms_actions: Vec<&str> = runs[1]["analysis"]["actions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["action_type"].as_str().unwrap())
        .collect();
    assert_eq!(perms_actions, vec!["Run Custom Script", "Mark for Manual Review"]);

    assert_eq!(runs[2]["analysis"]["actions"][0]["action_type"], "Do Nothing");
}

#[test]
fn test_batch_yaml_to_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let out_path = temp_dir.path().join("report.yaml");
    let batch = fixture_path("batch.yaml");

    let output = triagebox(&[
        "batch",
        batch.to_str().unwrap(),
        "--format",
        "yaml",
        "-o",
        out_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let report: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    let runs = report["runs"].as_sequence().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["failed_step"].as_str(), Some("Verify backup integrity"));
    assert_eq!(
        runs[1]["analysis"]["classifications"][0]["classification_type"].as_str(),
        Some("New Product Bug")
    );
}

#[test]
fn test_show_demo_run() {
    let output = triagebox(&["show", "run-0007"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("test_mysql_backup_and_verify"));
    assert!(stdout.contains("Backup Integrity Failure"));
    assert!(stdout.contains("Steps:"));
    assert!(stdout.contains("Verify backup integrity"));
}

#[test]
fn test_show_unknown_run_fails() {
    let output = triagebox(&["show", "run-9999"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No run with id 'run-9999'"));
}

#[test]
fn test_invalid_dedup_policy_is_rejected() {
    let output = Command::new(get_triagebox_binary())
        .args(["demo", "-f", "json"])
        .env("TRIAGEBOX_DEDUP_POLICY", "sometimes")
        .output()
        .expect("Failed to execute triagebox");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TRIAGEBOX_DEDUP_POLICY"));
}

#[test]
fn test_audit_file_receives_stage_entries() {
    let temp_dir = TempDir::new().unwrap();
    let audit_path = temp_dir.path().join("audit.jsonl");
    let log = fixture_path("logs/no_markers.log");

    let output = Command::new(get_triagebox_binary())
        .args(["triage", log.to_str().unwrap(), "-f", "json"])
        .env("TRIAGEBOX_AUDIT_FILE", &audit_path)
        .output()
        .expect("Failed to execute triagebox");
    assert!(output.status.success());

    let content = fs::read_to_string(&audit_path).unwrap();
    let stages: Vec<String> = content
        .lines()
        .map(|line| {
            let entry: serde_json::Value = serde_json::from_str(line).unwrap();
            entry["stage"].as_str().unwrap().to_string()
        })
        .collect();
    assert!(stages.contains(&"classify".to_string()));
}

#[test]
fn test_invalid_subcommand() {
    let output = triagebox(&["explode"]);
    assert!(!output.status.success());
}
