use std::fs;

use conform_core::db::ProjectLayout;
use predicates::prelude::*;
use tempfile::tempdir;

/// init-project without an explicit --root should use the current directory
/// as the project root and write the config file and database.
#[test]
fn init_project_uses_current_dir_by_default() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();

    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .current_dir(root)
        .arg("init-project")
        .arg("--name")
        .arg("TokenAudit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized sol-conform project:"))
        .stdout(predicate::str::contains("Name: TokenAudit"));

    let layout = ProjectLayout::new(root);
    assert!(layout.project_config_path.exists());
    assert!(layout.db_path.exists());
    for dir in layout.directories() {
        assert!(dir.is_dir(), "{} should exist", dir.display());
    }
}

/// Without --name the project is named after the root directory.
#[test]
fn init_project_infers_name_from_root() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path().join("my-tokens");
    fs::create_dir_all(&root).expect("mkdir");

    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("init-project")
        .arg("--root")
        .arg(&root)
        .assert()
        .success();

    let config = fs::read_to_string(ProjectLayout::new(&root).project_config_path).expect("config");
    let json: serde_json::Value = serde_json::from_str(&config).expect("config json");
    assert_eq!(json["name"], "my-tokens");
    assert_eq!(json["extensions"], serde_json::json!(["sol"]));
}

/// project-info should fail (non-zero exit) if no project config exists.
#[test]
fn project_info_fails_when_config_missing() {
    let dir = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("project-info")
        .arg("--root")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read project config"));
}

#[test]
fn project_info_reports_directories_and_specs() {
    let dir = tempdir().expect("tempdir");
    let root = dir.path();
    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("init-project")
        .arg("--root")
        .arg(root)
        .assert()
        .success();

    let layout = ProjectLayout::new(root);
    fs::write(layout.audits_dir.join("permits.yaml"), "name: permits\nsources: src\nstandard: erc2612-permit\n")
        .expect("write spec");
    fs::write(layout.audits_dir.join("broken.json"), "{\"name\": \"broken\"}").expect("write broken spec");
    fs::write(layout.audits_dir.join("notes.txt"), "ignored").expect("write notes");

    assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("project-info")
        .arg("--root")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("sol-conform Project Info"))
        .stdout(predicate::str::contains("Audit specs: 2"))
        .stdout(predicate::str::contains("- permits [erc2612-permit]"))
        .stdout(predicate::str::contains("broken").and(predicate::str::contains("INVALID")))
        .stdout(predicate::str::contains("Audit runs recorded: 0"));

    let output = assert_cmd::cargo::cargo_bin_cmd!("sol-conform")
        .arg("project-info")
        .arg("--root")
        .arg(root)
        .arg("--json")
        .output()
        .expect("run project-info --json");
    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).expect("info json");
    assert_eq!(info["tool_version"], "0.1.0");
    assert_eq!(info["audit_runs"], 0);
    assert_eq!(info["directories"].as_array().map(Vec::len), Some(5));
    assert!(info["directories"].as_array().into_iter().flatten().all(|d| d["exists"] == true));
    assert_eq!(info["audit_specs"][0]["name"], "broken");
    assert!(info["audit_specs"][0]["error"].is_string());
    assert_eq!(info["audit_specs"][1]["standard"], "erc2612-permit");
}
