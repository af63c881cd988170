use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use conform_core::audits::AuditSpec;
use conform_core::services::audit::{AuditBatch, FileOutcome};
use serde::Serialize;

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

#[derive(Debug, Serialize, Clone)]
pub struct AuditSpecInfo {
    pub name: String,
    pub path: String,
    pub format: String,
    pub standard: Option<String>,
    pub signature: Option<String>,
    /// Validation error, if the spec does not load cleanly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Discover audit specs under audits/ (yaml/yml/json).
pub fn collect_audit_specs(dir: &Path) -> Result<Vec<AuditSpecInfo>> {
    let mut specs = Vec::new();
    if !dir.is_dir() {
        return Ok(specs);
    }
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let entry_path = entry.path();
        let format = entry_path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_string();
        if !matches!(format.as_str(), "yaml" | "yml" | "json") {
            continue;
        }
        let stem = entry_path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();
        let info = match AuditSpec::load(&entry_path) {
            Ok(loaded) => AuditSpecInfo {
                name: loaded.spec.name,
                path: entry_path.display().to_string(),
                format,
                standard: loaded.spec.standard,
                signature: loaded.spec.signature,
                error: None,
            },
            Err(err) => AuditSpecInfo {
                name: stem,
                path: entry_path.display().to_string(),
                format,
                standard: None,
                signature: None,
                error: Some(err.to_string()),
            },
        };
        specs.push(info);
    }

    specs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(specs)
}

/// Print a batch as a per-implementation table followed by the rollup.
pub fn print_batch(batch: &AuditBatch) {
    for file in &batch.files {
        match &file.outcome {
            FileOutcome::Failed { error, file } => {
                println!("{file}");
                println!("  error: {error}");
            }
            FileOutcome::Report { all_implementations, gas_error_file, file, .. } => {
                println!("{file}");
                for implementation in all_implementations {
                    let verdict = if implementation.all_requirements_met {
                        "compliant"
                    } else if implementation.some_requirements_met {
                        "partial"
                    } else {
                        "non-compliant"
                    };
                    println!(
                        "  {} [{}..{}] {verdict}",
                        implementation.function,
                        implementation.implementation_location.start,
                        implementation.implementation_location.end
                    );
                    for (name, met) in implementation.requirements.checklist() {
                        println!("    {} {name}", if met { "[x]" } else { "[ ]" });
                    }
                    if !implementation.internal_calls.is_empty() {
                        println!("    calls: {}", implementation.internal_calls.join(", "));
                    }
                }
                if gas_error_file.is_some() {
                    println!("  gas family error: single-item transfer inside batch");
                }
            }
        }
    }
    let s = &batch.summary;
    println!();
    println!(
        "Files: {} (analyzed {}, failed {}) | Implementations: {} | Fully compliant: {} | Partially compliant: {}",
        s.files, s.analyzed, s.failed, s.implementations, s.fully_compliant, s.partially_compliant
    );
}
