use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use conform_core::audits::AuditSpec;
use conform_core::db::{open_project_db, AuditRunRecord, ProjectContext, ProjectLayout};
use conform_core::services::audit::{AuditRunner, Auditor, RunMetadata};
use conform_core::services::verifiers::default_verifier_registry;
use serde::Serialize;

use crate::canonicalize_or_current;
use crate::commands::print_batch;

/// Metadata written next to each run's report.
#[derive(Debug, Serialize)]
pub struct AuditRunMetadata {
    pub audit: String,
    pub run_id: Option<i64>,
    pub standard: String,
    pub signature: String,
    pub profile: String,
    pub sources: String,
    pub spec_hash: String,
    pub files: usize,
    pub analyzed: usize,
    pub failed: usize,
    pub implementations: usize,
    pub fully_compliant: usize,
    pub partially_compliant: usize,
}

#[derive(Debug, Serialize)]
struct RunDetail<'a> {
    run: &'a AuditRunRecord,
    files: Vec<serde_json::Value>,
}

/// Run an audit spec against the project and record the run.
pub fn run_audit_command(root: &str, file: &str, force: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let spec_path = Path::new(file);
    let loaded = AuditSpec::load(spec_path)
        .with_context(|| format!("Invalid audit spec at {}", spec_path.display()))?;
    let spec = loaded.spec;
    let target = spec.target()?;
    let profile = spec.profile_or(ctx.config.default_profile.unwrap_or_default());
    let parallel = spec.parallel.unwrap_or(ctx.config.parallel);

    let sources_path = ctx.spec_sources(&spec)?;
    let run_output_root = ctx.prepare_run_output(&spec.name, force)?;
    let provider = ctx.source_provider(&sources_path);
    let registry = default_verifier_registry();
    let auditor = Auditor::from_registry(&registry, target.standard, target.signature)?.with_profile(profile);
    let runner = AuditRunner { ctx: &ctx, auditor: &auditor };
    let meta = RunMetadata {
        audit: spec.name.clone(),
        spec_hash: loaded.spec_hash.clone(),
        sources: spec.sources.clone(),
    };

    let (batch, run_id) = runner.run(&provider, &meta, parallel)?;

    let report_path = run_output_root.join("report.json");
    batch.write_json(&report_path)?;

    let summary = &batch.summary;
    let metadata = AuditRunMetadata {
        audit: spec.name.clone(),
        run_id,
        standard: target.standard.to_string(),
        signature: auditor.signature().to_string(),
        profile: profile.to_string(),
        sources: sources_path.display().to_string(),
        spec_hash: loaded.spec_hash,
        files: summary.files,
        analyzed: summary.analyzed,
        failed: summary.failed,
        implementations: summary.implementations,
        fully_compliant: summary.fully_compliant,
        partially_compliant: summary.partially_compliant,
    };
    let metadata_path = run_output_root.join("run_metadata.json");
    fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)
        .with_context(|| format!("Failed to write run metadata to {}", metadata_path.display()))?;

    // Keep a normalized copy of the spec next to the outputs.
    let spec_copy_path = run_output_root.join("spec.yaml");
    fs::write(&spec_copy_path, spec.to_yaml()?)
        .with_context(|| format!("Failed to write spec copy to {}", spec_copy_path.display()))?;

    println!("Audit run complete:");
    println!("  Audit: {}", spec.name);
    match run_id {
        Some(id) => println!("  Run id: {id}"),
        None => println!("  Run id: (not recorded)"),
    }
    println!("  Standard: {}", target.standard);
    println!("  Signature: {}", auditor.signature());
    println!("  Profile: {profile}");
    println!("  Output: {}", run_output_root.display());
    println!();
    print_batch(&batch);

    Ok(())
}

/// List recorded audit runs, optionally for one audit.
pub fn list_runs_command(root: &str, audit: Option<&str>, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let (_, _, db) = open_project_db(&layout)?;

    let runs = db.list_audit_runs(audit).context("Failed to list audit runs")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No audit runs recorded.");
        return Ok(());
    }

    println!("Audit runs:");
    for run in &runs {
        println!(
            "- #{} {} [{}] {} files, {} fully / {} partially compliant ({})",
            run.id.unwrap_or_default(),
            run.audit,
            run.status.as_str(),
            run.files,
            run.fully_compliant,
            run.partially_compliant,
            run.finished_at
        );
    }

    Ok(())
}

/// Show the latest run of an audit with its per-file outcomes.
pub fn show_run_command(root: &str, audit: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);
    let (_, _, db) = open_project_db(&layout)?;

    let run = db
        .latest_run(audit)
        .context("Failed to load audit run")?
        .ok_or_else(|| anyhow!("No runs recorded for audit '{audit}'"))?;
    let run_id = run.id.ok_or_else(|| anyhow!("Run for audit '{audit}' has no id"))?;
    let outcomes = db.load_file_outcomes(run_id).context("Failed to load file outcomes")?;

    if json {
        let detail = RunDetail { run: &run, files: outcomes.into_iter().map(|o| o.outcome).collect() };
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("Audit run #{run_id}");
    println!("  Audit: {}", run.audit);
    println!("  Status: {}", run.status.as_str());
    println!("  Standard: {}", run.standard);
    println!("  Signature: {}", run.signature);
    println!("  Profile: {}", run.profile);
    println!("  Sources: {}", run.sources);
    println!("  Started: {}", run.started_at);
    println!("  Finished: {}", run.finished_at);
    println!(
        "  Files: {} ({} fully / {} partially compliant)",
        run.files, run.fully_compliant, run.partially_compliant
    );
    println!();
    for outcome in &outcomes {
        match &outcome.error {
            Some(err) => println!("- {}: {err}", outcome.path),
            None => {
                let count = outcome
                    .outcome
                    .get("all_implementations")
                    .and_then(|v| v.as_array())
                    .map_or(0, |a| a.len());
                println!("- {}: {count} implementation(s)", outcome.path);
            }
        }
    }

    Ok(())
}
