use serde::{Deserialize, Serialize};

use crate::services::audit::AuditedFile;

/// Allowed status values for audit runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditRunStatus {
    Running,
    Succeeded,
    Failed,
}

impl AuditRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditRunStatus::Running => "running",
            AuditRunStatus::Succeeded => "succeeded",
            AuditRunStatus::Failed => "failed",
        }
    }

    /// Parse a stored status string; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "running" => Some(AuditRunStatus::Running),
            "succeeded" => Some(AuditRunStatus::Succeeded),
            "failed" => Some(AuditRunStatus::Failed),
            _ => None,
        }
    }
}

/// Record describing one audit run (a batch over a source tree) for bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRunRecord {
    /// Row id; `None` until inserted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub audit: String,
    pub signature: String,
    pub standard: String,
    pub profile: String,
    pub spec_hash: String,
    pub sources: String,
    pub status: AuditRunStatus,
    pub started_at: String,
    pub finished_at: String,
    pub files: i64,
    pub fully_compliant: i64,
    pub partially_compliant: i64,
}

/// Stored outcome for one file of a run.
///
/// The outcome is kept as its serialized document so history stays readable
/// even as report shapes evolve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileOutcomeRecord {
    pub run_id: i64,
    pub path: String,
    pub content_hash: Option<String>,
    pub outcome: serde_json::Value,
    pub error: Option<String>,
}

impl FileOutcomeRecord {
    pub fn from_audited(run_id: i64, file: &AuditedFile) -> Result<Self, serde_json::Error> {
        Ok(Self {
            run_id,
            path: file.outcome.file().to_string(),
            content_hash: file.content_hash.clone(),
            outcome: serde_json::to_value(&file.outcome)?,
            error: file.outcome.error().map(str::to_string),
        })
    }
}
