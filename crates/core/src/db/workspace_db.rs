use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::api::SelectedPath;
use crate::db::{LastAnalysis, SessionRecord};
use crate::results::{AnalysisResultRecord, ResultStore};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for workspace database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// A JSON column could not be encoded or decoded.
    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed workspace database.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Providing small, testable helpers for querying and updating records.
///
/// It is also the durable [`ResultStore`].
#[derive(Debug)]
pub struct WorkspaceDb {
    conn: Connection,
}

impl WorkspaceDb {
    /// Open (or create) a workspace database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open a private in-memory database (mainly for tests).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert or replace a session record.
    pub fn upsert_session(&self, record: &SessionRecord) -> DbResult<()> {
        let tree_json = record.file_tree.as_ref().map(serde_json::to_string).transpose()?;
        self.conn.execute(
            r#"
            INSERT INTO sessions (session_id, archive_name, archive_hash, file_tree, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(session_id) DO UPDATE SET
                archive_name = excluded.archive_name,
                archive_hash = excluded.archive_hash,
                file_tree    = excluded.file_tree
            "#,
            params![
                record.session_id,
                record.archive_name,
                record.archive_hash,
                tree_json,
                record.created_at
            ],
        )?;
        Ok(())
    }

    /// Load one session by id.
    pub fn load_session(&self, session_id: &str) -> DbResult<Option<SessionRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT session_id, archive_name, archive_hash, file_tree, created_at
                FROM sessions
                WHERE session_id = ?1
                "#,
                params![session_id],
                map_session_row,
            )
            .optional()?;
        row.map(decode_session).transpose()
    }

    /// List all sessions (oldest first).
    pub fn list_sessions(&self) -> DbResult<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT session_id, archive_name, archive_hash, file_tree, created_at
            FROM sessions
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], map_session_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(decode_session(row?)?);
        }
        Ok(out)
    }

    /// Remember the latest analysis for a session, replacing any previous one.
    pub fn save_last_analysis(&self, session_id: &str, last: &LastAnalysis) -> DbResult<usize> {
        let json = serde_json::to_string(last)?;
        let updated = self.conn.execute(
            "UPDATE sessions SET last_analysis = ?2 WHERE session_id = ?1",
            params![session_id, json],
        )?;
        Ok(updated)
    }

    /// Load the latest analysis for a session, if one was saved.
    pub fn load_last_analysis(&self, session_id: &str) -> DbResult<Option<LastAnalysis>> {
        let json: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT last_analysis FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        match json.flatten() {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// List stored analysis results for a session in insertion order.
    pub fn list_results(&self, session_id: &str) -> DbResult<Vec<AnalysisResultRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT zip_url, zip_name, file_name, method_name, file_path, timestamp,
                   unique_id, selected_paths_count, paths_info
            FROM analysis_results
            WHERE session_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            let count: i64 = row.get(7)?;
            let paths_info: String = row.get(8)?;
            Ok((
                AnalysisResultRecord {
                    zip_url: row.get(0)?,
                    zip_name: row.get(1)?,
                    file_name: row.get(2)?,
                    method_name: row.get(3)?,
                    file_path: row.get(4)?,
                    timestamp: row.get(5)?,
                    unique_id: row.get(6)?,
                    selected_paths_count: usize::try_from(count).unwrap_or(0),
                    paths_info: Vec::new(),
                },
                paths_info,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (mut record, paths_info) = row?;
            record.paths_info = serde_json::from_str::<Vec<SelectedPath>>(&paths_info)?;
            out.push(record);
        }
        Ok(out)
    }

    /// Insert a result, or replace the one with the same unique id in place.
    ///
    /// The row id (and therefore list position) of a replaced record is kept.
    pub fn upsert_result(&self, session_id: &str, record: &AnalysisResultRecord) -> DbResult<()> {
        let record = record.clone().normalized();
        let paths_info = serde_json::to_string(&record.paths_info)?;
        self.conn.execute(
            r#"
            INSERT INTO analysis_results (session_id, unique_id, zip_url, zip_name, file_name,
                                          method_name, file_path, timestamp,
                                          selected_paths_count, paths_info)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(session_id, unique_id) DO UPDATE SET
                zip_url              = excluded.zip_url,
                zip_name             = excluded.zip_name,
                file_name            = excluded.file_name,
                method_name          = excluded.method_name,
                file_path            = excluded.file_path,
                timestamp            = excluded.timestamp,
                selected_paths_count = excluded.selected_paths_count,
                paths_info           = excluded.paths_info
            "#,
            params![
                session_id,
                record.unique_id,
                record.zip_url,
                record.zip_name,
                record.file_name,
                record.method_name,
                record.file_path,
                record.timestamp,
                record.selected_paths_count as i64,
                paths_info
            ],
        )?;
        Ok(())
    }

    /// Delete all results for a session; returns the number removed.
    pub fn clear_results(&self, session_id: &str) -> DbResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM analysis_results WHERE session_id = ?1", params![session_id])?;
        Ok(removed)
    }
}

impl ResultStore for WorkspaceDb {
    fn get(&self, session_id: &str) -> DbResult<Vec<AnalysisResultRecord>> {
        self.list_results(session_id)
    }

    fn put(&mut self, session_id: &str, record: AnalysisResultRecord) -> DbResult<()> {
        self.upsert_result(session_id, &record)
    }

    fn clear(&mut self, session_id: &str) -> DbResult<usize> {
        self.clear_results(session_id)
    }
}

type SessionRow = (String, Option<String>, Option<String>, Option<String>, String);

fn map_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_session(row: SessionRow) -> DbResult<SessionRecord> {
    let (session_id, archive_name, archive_hash, file_tree, created_at) = row;
    let file_tree = file_tree.map(|json| serde_json::from_str(&json)).transpose()?;
    Ok(SessionRecord { session_id, archive_name, archive_hash, file_tree, created_at })
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: sessions
/// - 2: analysis_results
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version < 1 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS sessions (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id    TEXT NOT NULL UNIQUE,
                archive_name  TEXT,
                archive_hash  TEXT,
                file_tree     TEXT,
                last_analysis TEXT,
                created_at    TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS analysis_results (
                id                   INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id           TEXT NOT NULL,
                unique_id            TEXT NOT NULL,
                zip_url              TEXT NOT NULL,
                zip_name             TEXT NOT NULL,
                file_name            TEXT NOT NULL,
                method_name          TEXT NOT NULL,
                file_path            TEXT NOT NULL,
                timestamp            TEXT NOT NULL,
                selected_paths_count INTEGER NOT NULL,
                paths_info           TEXT NOT NULL,
                UNIQUE (session_id, unique_id)
            );

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
