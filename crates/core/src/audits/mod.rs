//! Audit specs: declarative descriptions of what to audit and how.
//!
//! A spec names the sources to walk and the target (a standard preset, an
//! explicit signature, or both). Specs are YAML, or JSON when the file has a
//! `.json` extension.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::{Profile, Standard, StandardError};

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("Failed to read audit spec at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse audit spec JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse audit spec YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Audit spec '{0}' is required")]
    MissingField(&'static str),
    #[error("Audit name '{0}' must be a single plain path component (no '/', '\\', '..' or leading '.')")]
    InvalidName(String),
    #[error(transparent)]
    Target(#[from] StandardError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSpec {
    pub name: String,
    /// Directory or file to audit, relative to the project root or absolute.
    pub sources: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Target an audit spec resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub standard: Standard,
    pub signature: String,
}

/// A parsed spec together with the hash of the bytes it was parsed from.
#[derive(Debug, Clone)]
pub struct LoadedSpec {
    pub spec: AuditSpec,
    pub spec_hash: String,
}

impl AuditSpec {
    /// Parse spec bytes; `json` selects the JSON reader, otherwise YAML.
    pub fn parse(bytes: &[u8], json: bool) -> Result<Self, SpecError> {
        let spec = if json { serde_json::from_slice(bytes)? } else { serde_yaml::from_slice(bytes)? };
        Ok(spec)
    }

    /// Read, parse and validate a spec file.
    pub fn load(path: &Path) -> Result<LoadedSpec, SpecError> {
        let bytes = std::fs::read(path)
            .map_err(|source| SpecError::Read { path: path.display().to_string(), source })?;
        let json = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let spec = Self::parse(&bytes, json)?;
        spec.validate()?;
        Ok(LoadedSpec { spec, spec_hash: format!("{:x}", Sha256::digest(&bytes)) })
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        if self.name.trim().is_empty() {
            return Err(SpecError::MissingField("name"));
        }
        if !is_plain_name(&self.name) {
            return Err(SpecError::InvalidName(self.name.clone()));
        }
        if self.sources.trim().is_empty() {
            return Err(SpecError::MissingField("sources"));
        }
        self.target()?;
        Ok(())
    }

    /// Resolve the standard and signature to audit.
    pub fn target(&self) -> Result<ResolvedTarget, SpecError> {
        let (standard, signature) = Standard::resolve(self.standard.as_deref(), self.signature.as_deref())?;
        Ok(ResolvedTarget { standard, signature })
    }

    /// Spec profile, falling back to `default` when unset.
    pub fn profile_or(&self, default: Profile) -> Profile {
        self.profile.unwrap_or(default)
    }

    pub fn to_yaml(&self) -> Result<String, SpecError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Whether `name` can be used as one directory name under the run outputs.
///
/// Separators of either platform, `..` and hidden (leading `.`) names are
/// rejected, so an audit name never escapes `outputs/runs/`.
pub fn is_plain_name(name: &str) -> bool {
    if name.starts_with('.') || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}
