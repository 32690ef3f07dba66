use crate::core::error;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const BASELINE_DB_NAME: &str = "baseline.db";

pub const BASELINE_DB_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS baseline (
    hash        TEXT PRIMARY KEY,
    rule_id     TEXT NOT NULL,
    file        TEXT NOT NULL,
    excerpt     TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);
";

pub fn db_connect(db_path: &str) -> Result<Connection, error::PsguardError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::PsguardError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::PsguardError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::PsguardError::RusqliteError)?;
    Ok(conn)
}

pub fn baseline_db_path(root: &Path) -> PathBuf {
    root.join(BASELINE_DB_NAME)
}

// Subsystems own their schemas and initialization; the baseline plugin is
// currently the only database consumer.
