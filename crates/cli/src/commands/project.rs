use std::fs;

use anyhow::{Context, Result};
use conform_core::db::{open_project_db, ProjectConfig, ProjectDb, ProjectLayout};
use serde::Serialize;

use crate::commands::{collect_audit_specs, print_dir_status, AuditSpecInfo};
use crate::{canonicalize_or_current, infer_project_name};

#[derive(Debug, Serialize)]
struct ProjectInfo {
    tool_version: &'static str,
    name: String,
    root: String,
    config_file: String,
    config_version: String,
    db_path: String,
    default_profile: Option<String>,
    parallel: bool,
    extensions: Vec<String>,
    directories: Vec<DirStatus>,
    audit_specs: Vec<AuditSpecInfo>,
    audit_runs: i64,
}

#[derive(Debug, Serialize)]
struct DirStatus {
    label: &'static str,
    path: String,
    exists: bool,
}

/// Initialize a new project at the given root.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    for dir in layout.directories() {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }

    let db_path_rel = layout.db_path_relative_string();
    let config = ProjectConfig::new(&project_name, db_path_rel);

    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    // Create the DB now so later commands can rely on it.
    ProjectDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize project database at {}", layout.db_path.display())
    })?;

    tracing::info!(name = %project_name, root = %layout.root.display(), "project initialized");

    println!("Initialized sol-conform project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Audits dir: {}", layout.audits_dir.display());
    println!("  Reports dir: {}", layout.reports_dir.display());
    println!("  Outputs dir: {}", layout.outputs_dir.display());

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (config, _, db) = open_project_db(&layout)?;
    let audit_runs = db.count_audit_runs().context("Failed to count audit runs")?;
    let audit_specs = collect_audit_specs(&layout.audits_dir)?;

    let labelled = [
        ("Meta dir (.conform)", &layout.meta_dir),
        ("Audits dir", &layout.audits_dir),
        ("Reports dir", &layout.reports_dir),
        ("Outputs dir", &layout.outputs_dir),
        ("Runs dir", &layout.runs_dir),
    ];

    if json {
        let info = ProjectInfo {
            tool_version: conform_core::version(),
            name: config.name,
            root: layout.root.display().to_string(),
            config_file: layout.project_config_path.display().to_string(),
            config_version: config.config_version,
            db_path: config.db.path,
            default_profile: config.default_profile.map(|p| p.to_string()),
            parallel: config.parallel,
            extensions: config.extensions,
            directories: labelled
                .iter()
                .map(|&(label, path)| DirStatus {
                    label,
                    path: path.display().to_string(),
                    exists: path.is_dir(),
                })
                .collect(),
            audit_specs,
            audit_runs,
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("sol-conform Project Info");
    println!("========================");
    println!("Tool version: {}", conform_core::version());
    println!("Name: {}", config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.project_config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.db.path);
    if let Some(profile) = config.default_profile {
        println!("Default profile: {profile}");
    }
    println!("Parallel: {}", config.parallel);
    println!("Extensions: {}", config.extensions.join(", "));
    println!();

    println!("Directories:");
    for (label, path) in labelled {
        print_dir_status(label, path);
    }
    println!();

    println!("Audit specs: {}", audit_specs.len());
    for spec in &audit_specs {
        match &spec.error {
            Some(err) => println!("- {} ({}) INVALID: {err}", spec.name, spec.path),
            None => println!(
                "- {} [{}] {}",
                spec.name,
                spec.standard.as_deref().unwrap_or("-"),
                spec.signature.as_deref().unwrap_or("")
            ),
        }
    }
    println!("Audit runs recorded: {audit_runs}");

    Ok(())
}
