//! Project database integration and project layout definitions.
//!
//! This module wraps a SQLite database storing audit run histories and the
//! per-file outcomes of each run.
//!
//! It defines:
//! - `DbConfig`: simple DB path wrapper.
//! - `ProjectConfig`: serializable project metadata.
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectDb`: a small SQLite wrapper with a versioned schema.
//! - `AuditRunRecord` / `FileOutcomeRecord`: the rows it stores.

mod config;
mod context;
mod layout;
mod models;
mod project_db;

pub use config::{DbConfig, ProjectConfig};
pub use context::{load_project_config, open_project_db, ProjectContext};
pub use layout::ProjectLayout;
pub use models::{AuditRunRecord, AuditRunStatus, FileOutcomeRecord};
pub use project_db::{DbError, DbResult, ProjectDb, CURRENT_SCHEMA_VERSION};
