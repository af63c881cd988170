use std::path::Path;

use anyhow::{anyhow, Context, Result};
use conform_core::model::{Profile, Standard};
use conform_core::services::audit::Auditor;
use conform_core::services::sources::DirectorySource;
use conform_core::services::verifiers::default_verifier_registry;

use crate::commands::print_batch;

/// Options for a project-less analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub signature: Option<String>,
    pub standard: Option<String>,
    pub profile: Option<String>,
    pub extensions: Vec<String>,
    pub parallel: bool,
    pub json: bool,
    pub out: Option<String>,
}

/// Analyze a file or directory of sources without a project.
pub fn analyze_command(path: &str, opts: &AnalyzeOptions) -> Result<()> {
    let (standard, signature) = Standard::resolve(opts.standard.as_deref(), opts.signature.as_deref())?;
    let profile = match &opts.profile {
        Some(p) => p.parse::<Profile>()?,
        None => Profile::default(),
    };

    let source_path = Path::new(path);
    if !source_path.exists() {
        return Err(anyhow!("Source path does not exist: {}", source_path.display()));
    }
    let mut provider = DirectorySource::new(source_path);
    if !opts.extensions.is_empty() {
        provider = provider.with_extensions(opts.extensions.iter().cloned());
    }

    let registry = default_verifier_registry();
    let auditor = Auditor::from_registry(&registry, standard, signature)?.with_profile(profile);
    tracing::info!(standard = %standard, signature = auditor.signature(), %profile, "analyzing sources");

    let batch = auditor.audit(&provider, opts.parallel)?;

    if let Some(out) = &opts.out {
        let out_path = Path::new(out);
        batch.write_json(out_path).with_context(|| format!("Failed to write report to {}", out_path.display()))?;
    }

    if opts.json {
        println!("{}", batch.to_json()?);
    } else {
        println!("Standard: {standard}");
        println!("Signature: {}", auditor.signature());
        println!("Profile: {profile}");
        println!();
        print_batch(&batch);
        if let Some(out) = &opts.out {
            println!("Report written to {out}");
        }
    }

    Ok(())
}
