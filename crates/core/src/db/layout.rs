use std::path::{Path, PathBuf};

/// Logical layout of a project on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI is responsible for actually creating directories and files based on
/// this layout.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Root directory of the project.
    pub root: PathBuf,
    /// Directory for internal metadata (.conform).
    pub meta_dir: PathBuf,
    /// Path to the project config file (JSON).
    pub project_config_path: PathBuf,
    /// Path to the project database file.
    pub db_path: PathBuf,
    /// Directory for audit specs.
    pub audits_dir: PathBuf,
    /// Directory for exported reports.
    pub reports_dir: PathBuf,
    /// Directory for run outputs.
    pub outputs_dir: PathBuf,
    /// Directory for per-audit run artifacts (outputs/runs).
    pub runs_dir: PathBuf,
}

impl ProjectLayout {
    /// Compute the default layout for a project rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".conform");
        let project_config_path = meta_dir.join("project.json");
        let db_path = meta_dir.join("project.db");
        let audits_dir = root.join("audits");
        let reports_dir = root.join("reports");
        let outputs_dir = root.join("outputs");
        let runs_dir = outputs_dir.join("runs");

        Self { root, meta_dir, project_config_path, db_path, audits_dir, reports_dir, outputs_dir, runs_dir }
    }

    /// Directories `init-project` creates, in creation order.
    pub fn directories(&self) -> [&Path; 5] {
        [
            self.meta_dir.as_path(),
            self.audits_dir.as_path(),
            self.reports_dir.as_path(),
            self.outputs_dir.as_path(),
            self.runs_dir.as_path(),
        ]
    }

    /// Compute a database path string suitable for storing in `ProjectConfig`,
    /// typically as a path relative to `root`.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }

    /// Per-audit output root (`outputs/runs/<audit>`).
    pub fn run_output_root(&self, audit: &str) -> PathBuf {
        self.runs_dir.join(audit)
    }

    /// Resolve a path from an audit spec against the project root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
