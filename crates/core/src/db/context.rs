use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::audits::{is_plain_name, AuditSpec};
use crate::db::{ProjectConfig, ProjectDb, ProjectLayout};
use crate::services::sources::DirectorySource;

/// Read `.conform/project.json` for a layout.
pub fn load_project_config(layout: &ProjectLayout) -> Result<ProjectConfig> {
    let path = &layout.project_config_path;
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read project config at {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse project config at {}", path.display()))
}

/// Load the config and open the database it points at (relative paths hang off the root).
pub fn open_project_db(layout: &ProjectLayout) -> Result<(ProjectConfig, PathBuf, ProjectDb)> {
    let config = load_project_config(layout)?;
    let db_path = layout.resolve(&config.db.path);
    let db = ProjectDb::open(&db_path)
        .with_context(|| format!("Failed to open project database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}

/// An opened project: where things live, how it is configured, and its run history.
#[derive(Debug)]
pub struct ProjectContext {
    pub layout: ProjectLayout,
    pub config: ProjectConfig,
    pub db_path: PathBuf,
    pub db: ProjectDb,
}

impl ProjectContext {
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = ProjectLayout::new(root);
        let (config, db_path, db) = open_project_db(&layout)?;
        Ok(Self { layout, config, db_path, db })
    }

    /// Existing sources path named by `spec`.
    pub fn spec_sources(&self, spec: &AuditSpec) -> Result<PathBuf> {
        let path = self.layout.resolve(&spec.sources);
        if !path.exists() {
            return Err(anyhow!("Audit sources not found: {}", path.display()));
        }
        Ok(path)
    }

    /// Source walker for `sources` using the project's extensions.
    pub fn source_provider(&self, sources: &Path) -> DirectorySource {
        DirectorySource::new(sources).with_extensions(&self.config.extensions)
    }

    /// Create an empty `outputs/runs/<audit>` directory.
    ///
    /// An existing directory is an error unless `force` is set, in which case
    /// it is removed first.
    pub fn prepare_run_output(&self, audit: &str, force: bool) -> Result<PathBuf> {
        if !is_plain_name(audit) {
            return Err(anyhow!("Refusing to use audit name '{audit}' as an output directory"));
        }
        let dir = self.layout.run_output_root(audit);
        if dir.exists() {
            if !force {
                return Err(anyhow!(
                    "Audit output already exists at {} (rerun with --force to overwrite)",
                    dir.display()
                ));
            }
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to clean existing audit output dir {}", dir.display()))?;
            tracing::debug!(dir = %dir.display(), "removed previous audit output");
        }
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create audit output dir {}", dir.display()))?;
        Ok(dir)
    }
}
