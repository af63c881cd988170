//! Source enumeration seam for the orchestrator.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::services::audit::AuditError;

/// One enumerated source file.
///
/// A file that could not be read carries its error text instead of content,
/// so the orchestrator can record it without aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: Result<String, String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: Ok(text.into()) }
    }

    pub fn unreadable(path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        Self { path: path.into(), text: Err(error.into()) }
    }
}

/// Anything that can yield `(path, text)` pairs for a batch.
pub trait SourceProvider {
    fn sources(&self) -> Result<Vec<SourceFile>, AuditError>;
}

/// Walks a directory (or reads a single file) for sources with a recognized extension.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), extensions: vec!["sol".to_string()] }
    }

    /// Replace the accepted extensions (compared case-insensitively, without the dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "node_modules"
}

fn read_source(path: PathBuf) -> SourceFile {
    match std::fs::read_to_string(&path) {
        Ok(text) => SourceFile { path, text: Ok(text) },
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "failed to read source file");
            SourceFile { path, text: Err(err.to_string()) }
        }
    }
}

impl SourceProvider for DirectorySource {
    fn sources(&self) -> Result<Vec<SourceFile>, AuditError> {
        if self.root.is_file() {
            return Ok(vec![read_source(self.root.clone())]);
        }
        if !self.root.is_dir() {
            return Err(AuditError::MissingDirectory(self.root.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).into_iter().filter_entry(|e| !is_skipped_dir(e)) {
            match entry {
                Ok(entry) if entry.file_type().is_file() && self.accepts(entry.path()) => {
                    files.push(read_source(entry.into_path()));
                }
                Ok(_) => {}
                // The root itself failing is fatal; anything deeper is a per-entry error.
                Err(err) if err.depth() == 0 => return Err(AuditError::Walk(err.to_string())),
                Err(err) => match err.path() {
                    Some(path) if self.accepts(path) => {
                        files.push(SourceFile::unreadable(path, err.to_string()));
                    }
                    _ => tracing::warn!(%err, "skipping unreadable directory entry"),
                },
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(root = %self.root.display(), files = files.len(), "enumerated sources");
        Ok(files)
    }
}

/// In-memory sources, served in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Vec<SourceFile>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.files.push(SourceFile::new(path, text));
        self
    }

    pub fn with_unreadable(mut self, path: impl Into<PathBuf>, error: impl Into<String>) -> Self {
        self.files.push(SourceFile::unreadable(path, error));
        self
    }
}

impl SourceProvider for MemorySource {
    fn sources(&self) -> Result<Vec<SourceFile>, AuditError> {
        Ok(self.files.clone())
    }
}
