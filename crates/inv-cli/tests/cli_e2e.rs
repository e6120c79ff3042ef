//! Drives the `invctl` binary against a temporary database file.

use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::Value;

fn invctl(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_invctl"))
        .current_dir(workdir)
        .env_remove("INVENTORY_LOG")
        .args(["--db", "state/inventory.db"])
        .args(args)
        .output()
        .expect("invctl should run")
}

fn json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "invctl failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn create_get_and_blocked_delete() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let created = json(&invctl(root, &["create", "product", "--json", r#"{"name":"web"}"#]));
    assert_eq!(created["ids"], serde_json::json!([1]));

    json(&invctl(root, &["create", "team", "--json", r#"{"name":"sre"}"#]));
    json(&invctl(root, &["create", "environment", "--json", r#"{"name":"prod"}"#]));
    json(&invctl(root, &["create", "datacenter", "--json", r#"{"name":"dc1"}"#]));
    json(&invctl(root, &[
        "create",
        "cluster",
        "--json",
        r#"{"name":"k8s","datacenter_id":1}"#,
    ]));
    json(&invctl(root, &[
        "create",
        "hostgroup",
        "--json",
        r#"{"name":"web-eu","product_id":1,"team_id":1,"environment_id":1,"cluster_id":1}"#,
    ]));

    let product = json(&invctl(root, &["get", "product", "1"]));
    assert_eq!(product["name"], "web");

    let blocked = invctl(root, &["delete", "product", "1"]);
    assert!(!blocked.status.success());
    let stderr = String::from_utf8_lossy(&blocked.stderr);
    assert!(stderr.contains("hostgroups.product_id"), "stderr: {stderr}");
}

#[test]
fn missing_reference_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let out = invctl(dir.path(), &[
        "create",
        "cluster",
        "--json",
        r#"{"name":"orphan","datacenter_id":9}"#,
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Missing datacenter reference(s): [9]"));
}

#[test]
fn dependents_lists_graph_edges() {
    let dir = tempfile::tempdir().unwrap();
    let out = json(&invctl(dir.path(), &["dependents", "datacenter"]));
    assert_eq!(out["kind"], "datacenter");
    assert_eq!(
        out["dependents"],
        serde_json::json!([{ "column": { "kind": "cluster", "column": "datacenter_id" } }])
    );
}
