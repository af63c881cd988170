use std::fs;

use rusqlite::Connection;
use tempfile::tempdir;

use conform_core::db::{
    AuditRunRecord, AuditRunStatus, DbError, FileOutcomeRecord, ProjectConfig, ProjectContext, ProjectDb,
    ProjectLayout, CURRENT_SCHEMA_VERSION,
};
use conform_core::model::Standard;
use conform_core::services::audit::{Auditor, AuditRunner, RunMetadata};
use conform_core::services::sources::DirectorySource;
use conform_core::services::verifiers::default_verifier_registry;

fn run(audit: &str, status: AuditRunStatus, files: i64) -> AuditRunRecord {
    AuditRunRecord {
        id: None,
        audit: audit.into(),
        signature: "setApprovalForAll(address operator, bool approved)".into(),
        standard: "set-approval-for-all".into(),
        profile: "standard".into(),
        spec_hash: format!("hash-{audit}"),
        sources: "contracts".into(),
        status,
        started_at: "t0".into(),
        finished_at: "t1".into(),
        files,
        fully_compliant: 1,
        partially_compliant: 1,
    }
}

#[test]
fn fresh_db_is_migrated_to_current_version() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("project.db");
    let db = ProjectDb::open(&db_path).expect("open db");

    let version: i32 =
        db.connection().query_row("PRAGMA user_version;", [], |row| row.get(0)).expect("user_version");
    assert_eq!(version, CURRENT_SCHEMA_VERSION);

    let indexes: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name IN ('idx_audit_runs_audit', 'idx_audit_files_run')",
            [],
            |row| row.get(0),
        )
        .expect("count indexes");
    assert_eq!(indexes, 2);
    assert_eq!(db.count_audit_runs().expect("count"), 0);
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let db_path = dir.path().join("project.db");
    {
        let conn = Connection::open(&db_path).expect("open raw");
        conn.execute_batch("PRAGMA user_version = 99;").expect("bump version");
    }

    let err = ProjectDb::open(&db_path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion { found, max_supported, .. } => {
            assert_eq!(found, 99);
            assert_eq!(max_supported, CURRENT_SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn audit_runs_insert_list_and_latest() {
    let dir = tempdir().expect("tempdir");
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");

    let first = db.insert_audit_run(&run("approvals", AuditRunStatus::Succeeded, 3)).expect("insert");
    let other = db.insert_audit_run(&run("permits", AuditRunStatus::Failed, 0)).expect("insert");
    let second = db.insert_audit_run(&run("approvals", AuditRunStatus::Succeeded, 4)).expect("insert");
    assert!(first < other && other < second);

    let all = db.list_audit_runs(None).expect("list");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, Some(first));
    assert_eq!(all[1].status, AuditRunStatus::Failed);

    let approvals = db.list_audit_runs(Some("approvals")).expect("filter");
    assert_eq!(approvals.iter().map(|r| r.files).collect::<Vec<_>>(), vec![3, 4]);

    let latest = db.latest_run("approvals").expect("latest").expect("some run");
    assert_eq!(latest.id, Some(second));
    assert_eq!(latest.spec_hash, "hash-approvals");
    assert!(db.latest_run("nothing").expect("latest").is_none());
    assert_eq!(db.count_audit_runs().expect("count"), 3);
}

#[test]
fn file_outcomes_round_trip_in_insertion_order() {
    let dir = tempdir().expect("tempdir");
    let db = ProjectDb::open(&dir.path().join("project.db")).expect("open db");
    let run_id = db.insert_audit_run(&run("approvals", AuditRunStatus::Succeeded, 2)).expect("insert");

    let rows = vec![
        FileOutcomeRecord {
            run_id,
            path: "b.sol".into(),
            content_hash: Some("abc".into()),
            outcome: serde_json::json!({"file": "b.sol", "all_implementations": []}),
            error: None,
        },
        FileOutcomeRecord {
            run_id,
            path: "a.sol".into(),
            content_hash: None,
            outcome: serde_json::json!({"file": "a.sol", "error": "boom"}),
            error: Some("boom".into()),
        },
    ];
    assert_eq!(db.insert_file_outcomes(&rows).expect("insert outcomes"), 2);

    let loaded = db.load_file_outcomes(run_id).expect("load outcomes");
    assert_eq!(loaded, rows);
    assert!(db.load_file_outcomes(run_id + 1).expect("load other").is_empty());
}

#[test]
fn stored_status_round_trips_and_unknown_is_rejected() {
    for status in [AuditRunStatus::Running, AuditRunStatus::Succeeded, AuditRunStatus::Failed] {
        assert_eq!(AuditRunStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(AuditRunStatus::parse("SUCCEEDED"), Some(AuditRunStatus::Succeeded));
    assert_eq!(AuditRunStatus::parse("stubbed"), None);
}

fn init_project(root: &std::path::Path) -> ProjectLayout {
    let layout = ProjectLayout::new(root);
    for dir in layout.directories() {
        fs::create_dir_all(dir).expect("create dir");
    }
    let config = ProjectConfig::new("demo", layout.db_path_relative_string());
    fs::write(&layout.project_config_path, serde_json::to_string_pretty(&config).expect("config json"))
        .expect("write config");
    layout
}

#[test]
fn runner_records_run_and_file_outcomes() {
    let dir = tempdir().expect("tempdir");
    let layout = init_project(dir.path());
    let contracts = dir.path().join("contracts");
    fs::create_dir_all(&contracts).expect("mkdir contracts");
    fs::write(
        contracts.join("Good.sol"),
        "function setApprovalForAll(address operator, bool approved) public {\n    require(msg.sender != operator);\n    emit ApprovalForAll(msg.sender, operator, approved);\n}\n",
    )
    .expect("write good");
    fs::write(contracts.join("Empty.sol"), "contract Empty {}").expect("write empty");

    let ctx = ProjectContext::from_root(&layout.root).expect("context");
    assert_eq!(ctx.config.name, "demo");
    assert_eq!(ctx.db_path, layout.db_path);

    let registry = default_verifier_registry();
    let auditor = Auditor::from_registry(
        &registry,
        Standard::SetApprovalForAll,
        Standard::SetApprovalForAll.default_signature(),
    )
    .expect("auditor");
    let runner = AuditRunner { ctx: &ctx, auditor: &auditor };
    let meta = RunMetadata { audit: "approvals".into(), spec_hash: "h".into(), sources: "contracts".into() };

    let (batch, run_id) = runner.run(&DirectorySource::new(&contracts), &meta, false).expect("run");
    let run_id = run_id.expect("recorded");
    assert_eq!(batch.summary.files, 2);
    assert_eq!(batch.summary.fully_compliant, 1);

    let latest = ctx.db.latest_run("approvals").expect("latest").expect("some run");
    assert_eq!(latest.id, Some(run_id));
    assert_eq!(latest.status, AuditRunStatus::Succeeded);
    assert_eq!(latest.standard, "set-approval-for-all");
    assert_eq!(latest.files, 2);
    assert_eq!(latest.fully_compliant, 1);

    let outcomes = ctx.db.load_file_outcomes(run_id).expect("outcomes");
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].path.ends_with("Empty.sol"));
    assert_eq!(outcomes[0].error.as_deref(), Some("setApprovalForAll function not found"));
    assert!(outcomes[0].content_hash.is_some());
    assert!(outcomes[1].error.is_none());
    assert!(outcomes[1].outcome["all_implementations"][0]["all_requirements_met"].as_bool().unwrap_or(false));
}

#[test]
fn runner_records_failed_run_when_sources_are_missing() {
    let dir = tempdir().expect("tempdir");
    let layout = init_project(dir.path());
    let ctx = ProjectContext::from_root(&layout.root).expect("context");

    let registry = default_verifier_registry();
    let auditor = Auditor::from_registry(
        &registry,
        Standard::Erc2612Permit,
        Standard::Erc2612Permit.default_signature(),
    )
    .expect("auditor");
    let runner = AuditRunner { ctx: &ctx, auditor: &auditor };
    let meta = RunMetadata { audit: "permits".into(), spec_hash: "h".into(), sources: "missing".into() };

    assert!(runner.run(&DirectorySource::new(dir.path().join("missing")), &meta, false).is_err());
    let latest = ctx.db.latest_run("permits").expect("latest").expect("failed run recorded");
    assert_eq!(latest.status, AuditRunStatus::Failed);
    assert_eq!(latest.files, 0);
}

#[test]
fn context_requires_a_project_config() {
    let dir = tempdir().expect("tempdir");
    let err = ProjectContext::from_root(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to read project config"));
}

#[test]
fn context_prepares_run_outputs_and_resolves_sources() {
    let dir = tempdir().expect("tempdir");
    let layout = init_project(dir.path());
    fs::create_dir_all(dir.path().join("contracts")).expect("mkdir contracts");
    let ctx = ProjectContext::from_root(&layout.root).expect("context");

    let spec = conform_core::audits::AuditSpec::parse(
        b"name: approvals\nsources: contracts\nstandard: set-approval-for-all\n",
        false,
    )
    .expect("spec");
    assert_eq!(ctx.spec_sources(&spec).expect("sources"), dir.path().join("contracts"));

    let missing = conform_core::audits::AuditSpec { sources: "nowhere".into(), ..spec.clone() };
    let err = ctx.spec_sources(&missing).unwrap_err();
    assert!(err.to_string().contains("Audit sources not found"));

    let out = ctx.prepare_run_output("approvals", false).expect("first output");
    fs::write(out.join("report.json"), "[]").expect("write report");
    let err = ctx.prepare_run_output("approvals", false).unwrap_err();
    assert!(err.to_string().contains("--force"));

    let again = ctx.prepare_run_output("approvals", true).expect("forced output");
    assert_eq!(again, out);
    assert!(!again.join("report.json").exists());
}

#[test]
fn run_output_never_leaves_the_runs_dir() {
    let dir = tempdir().expect("tempdir");
    let layout = init_project(dir.path());
    let ctx = ProjectContext::from_root(&layout.root).expect("context");

    for name in ["../..", "..", "nested/run"] {
        assert!(ctx.prepare_run_output(name, true).is_err(), "{name:?} should be rejected");
    }
    assert!(layout.project_config_path.exists());
    assert!(layout.runs_dir.is_dir());
}
