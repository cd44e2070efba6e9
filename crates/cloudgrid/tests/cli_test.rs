#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! once assert_cmd 2.1 is the floor

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Writes a config pointing at a file store and seeds it with one SSH key.
fn seeded_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("store.json");

    fs::write(
        temp_dir.path().join("cloudgrid.yaml"),
        format!(
            "proxy:\n  endpoint: http://127.0.0.1:9/spider\nstore:\n  backend: file\n  path: {}\n",
            store_path.display()
        ),
    )
    .unwrap();

    let snapshot = serde_json::json!({
        "version": 1,
        "updated_at": "2026-01-01T00:00:00Z",
        "entries": {
            "/ns/ns01/resources/sshKey/key01": serde_json::json!({
                "id": "key01",
                "name": "key01",
                "connectionName": "aws-ap-northeast-2",
                "cspResourceName": "ns01-key01",
                "associatedObjectList": []
            }).to_string()
        }
    });
    fs::write(&store_path, snapshot.to_string()).unwrap();

    temp_dir
}

fn cgctl(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cgctl").unwrap();
    cmd.current_dir(dir)
        .env_remove("CLOUDGRID_CONFIG_PATH")
        .env_remove("CLOUDGRID_STORE_PATH")
        .env_remove("CLOUDGRID_PROXY_ENDPOINT")
        .env("CLOUDGRID_NS", "ns01");
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("cgctl").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resource"))
        .stdout(predicate::str::contains("subnet"))
        .stdout(predicate::str::contains("spec"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("cgctl").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

#[test]
fn test_invalid_kind_is_rejected() {
    let workspace = seeded_workspace();
    cgctl(workspace.path())
        .args(["resource", "list", "server"])
        .assert()
        .failure();
}

#[test]
fn test_memory_backend_lists_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("memory.yaml");
    fs::write(&config, "store:\n  backend: memory\n").unwrap();

    cgctl(temp_dir.path())
        .args(["--config", config.to_str().unwrap()])
        .args(["resource", "list", "sshKey"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_check_and_get_from_file_store() {
    let workspace = seeded_workspace();

    cgctl(workspace.path())
        .args(["resource", "check", "sshKey", "key01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exists\": true"));

    cgctl(workspace.path())
        .args(["resource", "check", "sshKey", "key02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exists\": false"));

    cgctl(workspace.path())
        .args(["resource", "get", "sshKey", "key01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"cspResourceName\": \"ns01-key01\""));
}

#[test]
fn test_other_namespace_is_empty() {
    let workspace = seeded_workspace();
    cgctl(workspace.path())
        .args(["--ns", "ns02", "resource", "list", "sshKey", "--ids"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_get_missing_resource_fails() {
    let workspace = seeded_workspace();
    cgctl(workspace.path())
        .args(["resource", "get", "sshKey", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_association_blocks_delete() {
    let workspace = seeded_workspace();

    cgctl(workspace.path())
        .args(["assoc", "add", "sshKey", "key01", "/ns/ns01/mci/m1/vm/vm1"])
        .assert()
        .success();

    cgctl(workspace.path())
        .args(["assoc", "count", "sshKey", "key01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 1"));

    cgctl(workspace.path())
        .args(["resource", "delete", "sshKey", "key01"])
        .assert()
        .failure();

    // The record survives the refused delete
    cgctl(workspace.path())
        .args(["resource", "check", "sshKey", "key01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exists\": true"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    cgctl(temp_dir.path())
        .args(["--config", "/nonexistent/cloudgrid.yaml"])
        .args(["resource", "list", "sshKey"])
        .assert()
        .failure();
}

#[test]
fn test_inverted_range_is_rejected() {
    let workspace = seeded_workspace();
    cgctl(workspace.path())
        .args(["spec", "filter", "--range", "vCPU=8:2"])
        .assert()
        .failure();
}
