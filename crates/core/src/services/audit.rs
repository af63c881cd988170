//! Audit orchestration: drive extraction, matching, resolution and
//! verification over a batch of source files and roll the results up.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::analysis::{contains_assembly, extract_functions, match_signature, resolve_calls, CallClosure};
use crate::db::{AuditRunRecord, AuditRunStatus, FileOutcomeRecord, ProjectContext};
use crate::model::{FunctionRecord, ParameterList, Profile, RequirementReport, Standard};
use crate::services::sources::{SourceFile, SourceProvider};
use crate::services::verifiers::{VerificationContext, Verifier, VerifierRegistry};

/// Reported when every matched target was skipped.
pub const NO_VALID_IMPLEMENTATIONS: &str =
    "No valid implementations found (possibly due to recursive calls or inline assembly)";

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Source directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Failed to walk sources: {0}")]
    Walk(String),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No verifier registered for standard '{0}'")]
    UnknownStandard(String),
    #[error("Invalid target signature '{0}': expected name(type name, ...)")]
    InvalidSignature(String),
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Byte span of a matched implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

/// Scored result for one matched implementation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementationReport {
    pub function: String,
    pub implementation_location: Location,
    pub parameters: ParameterList,
    pub requirements: RequirementReport,
    pub internal_calls: Vec<String>,
    pub all_requirements_met: bool,
    pub some_requirements_met: bool,
}

impl ImplementationReport {
    fn new(target: &FunctionRecord, callees: &[FunctionRecord], requirements: RequirementReport) -> Self {
        Self {
            function: target.name.clone(),
            implementation_location: Location { start: target.start, end: target.end },
            parameters: target.parameters.clone(),
            all_requirements_met: requirements.all_met(),
            some_requirements_met: requirements.some_met(),
            requirements,
            internal_calls: callees.iter().map(|f| f.name.clone()).collect(),
        }
    }

    fn has_gas_family_error(&self) -> bool {
        matches!(
            &self.requirements,
            RequirementReport::BatchTransfer(r) if r.gas_family_errors == Some(true)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub total_implementations: usize,
    pub fully_compliant: usize,
    pub partially_compliant: usize,
}

impl FileSummary {
    fn of(implementations: &[ImplementationReport]) -> Self {
        Self {
            total_implementations: implementations.len(),
            fully_compliant: implementations.iter().filter(|r| r.all_requirements_met).count(),
            partially_compliant: implementations.iter().filter(|r| r.some_requirements_met).count(),
        }
    }
}

/// Per-file document handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Report {
        all_implementations: Vec<ImplementationReport>,
        summary: FileSummary,
        #[serde(skip_serializing_if = "Option::is_none")]
        gas_error_file: Option<String>,
        file: String,
    },
    Failed {
        error: String,
        file: String,
    },
}

impl FileOutcome {
    pub fn file(&self) -> &str {
        match self {
            FileOutcome::Report { file, .. } | FileOutcome::Failed { file, .. } => file,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FileOutcome::Failed { error, .. } => Some(error),
            FileOutcome::Report { .. } => None,
        }
    }

    pub fn implementations(&self) -> &[ImplementationReport] {
        match self {
            FileOutcome::Report { all_implementations, .. } => all_implementations,
            FileOutcome::Failed { .. } => &[],
        }
    }
}

/// Outcome plus the identity of the content it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditedFile {
    pub outcome: FileOutcome,
    /// SHA-256 of the file text; absent when the file could not be read.
    pub content_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files: usize,
    pub analyzed: usize,
    pub failed: usize,
    pub implementations: usize,
    pub fully_compliant: usize,
    pub partially_compliant: usize,
}

impl BatchSummary {
    fn of(files: &[AuditedFile]) -> Self {
        let mut summary = BatchSummary { files: files.len(), ..Default::default() };
        for file in files {
            match &file.outcome {
                FileOutcome::Report { summary: s, .. } => {
                    summary.analyzed += 1;
                    summary.implementations += s.total_implementations;
                    summary.fully_compliant += s.fully_compliant;
                    summary.partially_compliant += s.partially_compliant;
                }
                FileOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}

/// Every file of one batch, in enumeration order, with the rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditBatch {
    pub files: Vec<AuditedFile>,
    pub summary: BatchSummary,
}

impl AuditBatch {
    pub fn outcomes(&self) -> Vec<&FileOutcome> {
        self.files.iter().map(|f| &f.outcome).collect()
    }

    /// Pretty JSON array of per-file documents.
    pub fn to_json(&self) -> Result<String, AuditError> {
        Ok(serde_json::to_string_pretty(&self.outcomes())?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), AuditError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| AuditError::Io { path: path.to_path_buf(), source })
    }
}

/// SHA-256 of `text` as lowercase hex.
pub fn content_hash(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

/// Runs one verifier against one target signature.
pub struct Auditor<'a> {
    verifier: &'a dyn Verifier,
    signature: String,
    function_name: String,
    profile: Profile,
}

impl<'a> Auditor<'a> {
    pub fn new(verifier: &'a dyn Verifier, signature: impl Into<String>) -> Result<Self, AuditError> {
        let signature = signature.into();
        let Some(paren) = signature.find('(') else {
            return Err(AuditError::InvalidSignature(signature));
        };
        let function_name = signature[..paren].trim().to_string();
        Ok(Self { verifier, signature, function_name, profile: Profile::Standard })
    }

    /// Look the verifier for `standard` up in `registry`.
    pub fn from_registry(
        registry: &'a VerifierRegistry,
        standard: Standard,
        signature: impl Into<String>,
    ) -> Result<Self, AuditError> {
        let verifier = registry
            .get(standard)
            .ok_or_else(|| AuditError::UnknownStandard(standard.to_string()))?;
        Self::new(verifier, signature)
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn standard(&self) -> Standard {
        self.verifier.standard()
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Score every implementation of the target in `source`.
    ///
    /// Targets whose body or callees contain inline assembly, and targets whose
    /// only calls are to themselves, are skipped. The error string is the
    /// per-file document's `error` value.
    pub fn analyze_source(&self, source: &str) -> Result<Vec<ImplementationReport>, String> {
        let functions = extract_functions(source);
        let targets = match_signature(&functions, &self.signature);
        if targets.is_empty() {
            return Err(format!("{} function not found", self.function_name));
        }

        let mut implementations = Vec::new();
        for target in &targets {
            if contains_assembly(&target.body) {
                tracing::debug!(function = %target.name, start = target.start, "skipping target: inline assembly");
                continue;
            }
            let closure = resolve_calls(&target.body, &functions);
            if matches!(closure, CallClosure::SelfRecursive) {
                tracing::debug!(function = %target.name, start = target.start, "skipping target: self-recursive");
                continue;
            }
            let callees = closure.callees();
            if let Some(callee) = callees.iter().find(|f| contains_assembly(&f.body)) {
                tracing::debug!(
                    function = %target.name,
                    callee = %callee.name,
                    "skipping target: inline assembly in callee"
                );
                continue;
            }

            let ctx = VerificationContext::new(target, callees, source).with_profile(self.profile);
            let mut requirements = self.verifier.verify(&ctx);
            self.verifier.apply_callee_shortcuts(&mut requirements, callees, self.profile);
            implementations.push(ImplementationReport::new(target, callees, requirements));
        }

        if implementations.is_empty() {
            return Err(NO_VALID_IMPLEMENTATIONS.to_string());
        }
        Ok(implementations)
    }

    pub fn analyze_file(&self, file: &SourceFile) -> AuditedFile {
        let name = file.path.display().to_string();
        let text = match &file.text {
            Ok(text) => text,
            Err(err) => {
                return AuditedFile {
                    outcome: FileOutcome::Failed { error: format!("Error processing file: {err}"), file: name },
                    content_hash: None,
                };
            }
        };

        let outcome = match self.analyze_source(text) {
            Ok(all_implementations) => {
                let gas_error_file = all_implementations
                    .iter()
                    .any(ImplementationReport::has_gas_family_error)
                    .then(|| name.clone());
                if gas_error_file.is_some() {
                    tracing::info!(file = %name, "gas family error found");
                }
                FileOutcome::Report {
                    summary: FileSummary::of(&all_implementations),
                    all_implementations,
                    gas_error_file,
                    file: name,
                }
            }
            Err(error) => FileOutcome::Failed { error, file: name },
        };
        tracing::debug!(file = %outcome.file(), failed = outcome.error().is_some(), "analyzed file");
        AuditedFile { outcome, content_hash: Some(content_hash(text)) }
    }

    /// Analyze every file the provider yields. Only enumeration can fail.
    pub fn audit(&self, provider: &dyn SourceProvider, parallel: bool) -> Result<AuditBatch, AuditError> {
        let sources = provider.sources()?;
        let files: Vec<AuditedFile> = if parallel {
            sources.par_iter().map(|f| self.analyze_file(f)).collect()
        } else {
            sources.iter().map(|f| self.analyze_file(f)).collect()
        };
        let summary = BatchSummary::of(&files);
        tracing::info!(
            files = summary.files,
            failed = summary.failed,
            implementations = summary.implementations,
            fully_compliant = summary.fully_compliant,
            "audit batch complete"
        );
        Ok(AuditBatch { files, summary })
    }
}

/// What a persisted run is recorded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetadata {
    pub audit: String,
    pub spec_hash: String,
    pub sources: String,
}

/// Coordinator that ties project context + auditor to persist run results.
pub struct AuditRunner<'a> {
    pub ctx: &'a ProjectContext,
    pub auditor: &'a Auditor<'a>,
}

impl<'a> AuditRunner<'a> {
    /// Run the batch and record it. Returns the batch and the run id, if the
    /// run could be recorded; persistence failures never fail the audit.
    pub fn run(
        &self,
        provider: &dyn SourceProvider,
        meta: &RunMetadata,
        parallel: bool,
    ) -> Result<(AuditBatch, Option<i64>), AuditError> {
        let started_at = Utc::now().to_rfc3339();
        let result = self.auditor.audit(provider, parallel);
        let finished_at = Utc::now().to_rfc3339();

        let mut record = AuditRunRecord {
            id: None,
            audit: meta.audit.clone(),
            signature: self.auditor.signature().to_string(),
            standard: self.auditor.standard().to_string(),
            profile: self.auditor.profile().to_string(),
            spec_hash: meta.spec_hash.clone(),
            sources: meta.sources.clone(),
            status: AuditRunStatus::Failed,
            started_at,
            finished_at,
            files: 0,
            fully_compliant: 0,
            partially_compliant: 0,
        };

        let batch = match result {
            Ok(batch) => batch,
            Err(err) => {
                if let Err(db_err) = self.ctx.db.insert_audit_run(&record) {
                    tracing::warn!(%db_err, "failed to record failed audit run");
                }
                return Err(err);
            }
        };

        record.status = AuditRunStatus::Succeeded;
        record.files = batch.summary.files as i64;
        record.fully_compliant = batch.summary.fully_compliant as i64;
        record.partially_compliant = batch.summary.partially_compliant as i64;

        let run_id = match self.ctx.db.insert_audit_run(&record) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!(%err, audit = %meta.audit, "failed to record audit run");
                None
            }
        };
        if let Some(id) = run_id {
            let mut rows = Vec::with_capacity(batch.files.len());
            for file in &batch.files {
                match FileOutcomeRecord::from_audited(id, file) {
                    Ok(row) => rows.push(row),
                    Err(err) => {
                        tracing::warn!(%err, run_id = id, file = %file.outcome.file(), "failed to encode file outcome");
                    }
                }
            }
            if let Err(err) = self.ctx.db.insert_file_outcomes(&rows) {
                tracing::warn!(%err, run_id = id, "failed to record file outcomes");
            }
        }

        Ok((batch, run_id))
    }
}
