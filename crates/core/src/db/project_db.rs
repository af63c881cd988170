use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::db::{AuditRunRecord, AuditRunStatus, FileOutcomeRecord};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },

    /// A stored outcome document could not be encoded or decoded.
    #[error("Invalid stored outcome: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

const RUN_COLUMNS: &str = "id, audit, signature, standard, profile, spec_hash, sources, status, \
     started_at, finished_at, files, fully_compliant, partially_compliant";

/// SQLite-backed project database.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Recording audit runs and their per-file outcomes.
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a project database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert an audit run record and return its row id.
    pub fn insert_audit_run(&self, record: &AuditRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO audit_runs (audit, signature, standard, profile, spec_hash, sources, status,
                                    started_at, finished_at, files, fully_compliant, partially_compliant)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.audit,
                record.signature,
                record.standard,
                record.profile,
                record.spec_hash,
                record.sources,
                record.status.as_str(),
                record.started_at,
                record.finished_at,
                record.files,
                record.fully_compliant,
                record.partially_compliant
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Persist per-file outcomes in one transaction; returns the number of rows written.
    pub fn insert_file_outcomes(&self, records: &[FileOutcomeRecord]) -> DbResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO audit_files (run_id, path, content_hash, outcome_json, error)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;
            for record in records {
                let outcome_json = serde_json::to_string(&record.outcome)?;
                stmt.execute(params![
                    record.run_id,
                    record.path,
                    record.content_hash,
                    outcome_json,
                    record.error
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// List audit runs (ordered by id), optionally filtered by audit name.
    pub fn list_audit_runs(&self, audit: Option<&str>) -> DbResult<Vec<AuditRunRecord>> {
        let mut out = Vec::new();
        match audit {
            Some(name) => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {RUN_COLUMNS} FROM audit_runs WHERE audit = ?1 ORDER BY id"))?;
                for row in stmt.query_map(params![name], map_run)? {
                    out.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(&format!("SELECT {RUN_COLUMNS} FROM audit_runs ORDER BY id"))?;
                for row in stmt.query_map([], map_run)? {
                    out.push(row?);
                }
            }
        }
        Ok(out)
    }

    /// Most recent run recorded for `audit`, if any.
    pub fn latest_run(&self, audit: &str) -> DbResult<Option<AuditRunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {RUN_COLUMNS} FROM audit_runs WHERE audit = ?1 ORDER BY id DESC LIMIT 1"),
                params![audit],
                map_run,
            )
            .optional()?;
        Ok(run)
    }

    /// Load the per-file outcomes of a run, in insertion order.
    pub fn load_file_outcomes(&self, run_id: i64) -> DbResult<Vec<FileOutcomeRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT path, content_hash, outcome_json, error
            FROM audit_files
            WHERE run_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (path, content_hash, outcome_json, error) = row?;
            out.push(FileOutcomeRecord {
                run_id,
                path,
                content_hash,
                outcome: serde_json::from_str(&outcome_json)?,
                error,
            });
        }
        Ok(out)
    }

    /// Number of recorded runs.
    pub fn count_audit_runs(&self) -> DbResult<i64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM audit_runs", [], |row| row.get(0))?)
    }
}

fn map_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditRunRecord> {
    let status: String = row.get(7)?;
    Ok(AuditRunRecord {
        id: Some(row.get(0)?),
        audit: row.get(1)?,
        signature: row.get(2)?,
        standard: row.get(3)?,
        profile: row.get(4)?,
        spec_hash: row.get(5)?,
        sources: row.get(6)?,
        status: AuditRunStatus::parse(&status)
            .ok_or_else(|| rusqlite::Error::InvalidColumnType(7, "status".to_string(), Type::Text))?,
        started_at: row.get(8)?,
        finished_at: row.get(9)?,
        files: row.get(10)?,
        fully_compliant: row.get(11)?,
        partially_compliant: row.get(12)?,
    })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: audit_runs and audit_files tables
/// - 2: lookup indexes on audit name and run id
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS audit_runs (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                audit               TEXT NOT NULL,
                signature           TEXT NOT NULL,
                standard            TEXT NOT NULL,
                profile             TEXT NOT NULL,
                spec_hash           TEXT NOT NULL,
                sources             TEXT NOT NULL,
                status              TEXT NOT NULL,
                started_at          TEXT NOT NULL,
                finished_at         TEXT NOT NULL,
                files               INTEGER NOT NULL DEFAULT 0,
                fully_compliant     INTEGER NOT NULL DEFAULT 0,
                partially_compliant INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS audit_files (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id       INTEGER NOT NULL REFERENCES audit_runs(id),
                path         TEXT NOT NULL,
                content_hash TEXT,
                outcome_json TEXT NOT NULL,
                error        TEXT
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE INDEX IF NOT EXISTS idx_audit_runs_audit ON audit_runs(audit);
            CREATE INDEX IF NOT EXISTS idx_audit_files_run ON audit_files(run_id);
            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
