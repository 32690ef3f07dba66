//! Baseline subsystem: accepted findings that `check` suppresses.
//!
//! Adopting psguard on an existing module means inheriting its findings.
//! `baseline record` stores each current finding's suppression hash in
//! SQLite; later runs drop matching findings so only new debt is reported.
//! Every mutation is mirrored to `baseline.events.jsonl` as an append-only
//! audit trail.

use crate::core::config::Config;
use crate::core::db;
use crate::core::engine::{run_check, CheckOptions};
use crate::core::error::PsguardError;
use crate::core::store::Store;
use crate::core::time;
use crate::rules::Registry;
use clap::Subcommand;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(clap::Args, Debug)]
pub struct BaselineCli {
    #[clap(subcommand)]
    pub command: BaselineCommand,
}

#[derive(Subcommand, Debug)]
pub enum BaselineCommand {
    /// Record current findings as accepted.
    Record {
        /// Paths to scan (defaults to the project root).
        paths: Vec<PathBuf>,
    },
    /// List accepted findings.
    List,
    /// Drop every accepted finding.
    Clear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub hash: String,
    pub rule_id: String,
    pub file: String,
    pub excerpt: String,
    pub recorded_at: String,
}

pub fn baseline_events_path(root: &Path) -> PathBuf {
    root.join("baseline.events.jsonl")
}

pub fn initialize_baseline_db(root: &Path) -> Result<(), PsguardError> {
    std::fs::create_dir_all(root).map_err(PsguardError::IoError)?;
    let db_path = db::baseline_db_path(root);
    let conn = db::db_connect(&db_path.to_string_lossy())?;
    conn.execute(db::BASELINE_DB_SCHEMA, [])
        .map_err(PsguardError::RusqliteError)?;
    Ok(())
}

/// Suppression hashes for the engine's baseline filter.
pub fn load_hashes(store: &Store) -> Result<FxHashSet<String>, PsguardError> {
    let db_path = db::baseline_db_path(&store.root);
    if !db_path.exists() {
        return Ok(FxHashSet::default());
    }
    let conn = db::db_connect(&db_path.to_string_lossy())?;
    let mut stmt = conn
        .prepare("SELECT hash FROM baseline")
        .map_err(PsguardError::RusqliteError)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(PsguardError::RusqliteError)?;
    let mut out = FxHashSet::default();
    for r in rows {
        out.insert(r.map_err(PsguardError::RusqliteError)?);
    }
    Ok(out)
}

pub fn list_entries(store: &Store) -> Result<Vec<BaselineEntry>, PsguardError> {
    let db_path = db::baseline_db_path(&store.root);
    if !db_path.exists() {
        return Ok(Vec::new());
    }
    let conn = db::db_connect(&db_path.to_string_lossy())?;
    let mut stmt = conn
        .prepare(
            "SELECT hash, rule_id, file, excerpt, recorded_at FROM baseline \
             ORDER BY file, rule_id, hash",
        )
        .map_err(PsguardError::RusqliteError)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(BaselineEntry {
                hash: row.get(0)?,
                rule_id: row.get(1)?,
                file: row.get(2)?,
                excerpt: row.get(3)?,
                recorded_at: row.get(4)?,
            })
        })
        .map_err(PsguardError::RusqliteError)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(PsguardError::RusqliteError)?);
    }
    Ok(out)
}

/// Record the findings of a fresh check run. Returns how many entries are
/// new; re-recording an already-accepted finding is a no-op.
pub fn record(
    store: &Store,
    registry: &Registry,
    config: &Config,
    opts: &CheckOptions,
) -> Result<usize, PsguardError> {
    initialize_baseline_db(&store.root)?;
    let report = run_check(registry, config, opts, &FxHashSet::default())?;

    let db_path = db::baseline_db_path(&store.root);
    let conn = db::db_connect(&db_path.to_string_lossy())?;
    let now = time::now_epoch_z();
    let mut added = 0usize;
    for finding in &report.findings {
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO baseline (hash, rule_id, file, excerpt, recorded_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    finding.baseline_hash(),
                    finding.rule_id,
                    finding.file,
                    finding.excerpt,
                    now
                ],
            )
            .map_err(PsguardError::RusqliteError)?;
        added += inserted;
    }

    log_baseline_event(store, "baseline.record", added)?;
    Ok(added)
}

pub fn clear(store: &Store) -> Result<usize, PsguardError> {
    let db_path = db::baseline_db_path(&store.root);
    if !db_path.exists() {
        return Ok(0);
    }
    let conn = db::db_connect(&db_path.to_string_lossy())?;
    let removed = conn
        .execute("DELETE FROM baseline", [])
        .map_err(PsguardError::RusqliteError)?;
    log_baseline_event(store, "baseline.clear", removed)?;
    Ok(removed)
}

fn log_baseline_event(store: &Store, op: &str, count: usize) -> Result<(), PsguardError> {
    use std::fs::OpenOptions;
    use std::io::Write;

    let path = baseline_events_path(&store.root);
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(PsguardError::IoError)?;

    let event = serde_json::json!({
        "ts": time::now_epoch_z(),
        "event_id": time::new_event_id(),
        "op": op,
        "count": count,
        "status": "success"
    });

    writeln!(f, "{}", serde_json::to_string(&event).unwrap()).map_err(PsguardError::IoError)?;
    Ok(())
}

pub fn run_baseline_cli(
    store: &Store,
    project_root: &Path,
    registry: &Registry,
    config: &Config,
    cli: BaselineCli,
) -> Result<(), PsguardError> {
    match cli.command {
        BaselineCommand::Record { paths } => {
            let opts = CheckOptions {
                paths: if paths.is_empty() {
                    vec![project_root.to_path_buf()]
                } else {
                    paths
                },
                only_rules: Vec::new(),
            };
            let added = record(store, registry, config, &opts)?;
            println!("Baseline recorded: {} new finding(s) accepted", added);
        }
        BaselineCommand::List => {
            let entries = list_entries(store)?;
            println!("{}", serde_json::to_string_pretty(&entries).unwrap());
        }
        BaselineCommand::Clear => {
            let removed = clear(store)?;
            println!("Baseline cleared: {} entry(ies) removed", removed);
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "baseline",
        "version": "1.0.0",
        "description": "Accepted findings suppressed by check",
        "commands": [
            { "name": "record", "description": "Record current findings as accepted" },
            { "name": "list", "description": "List accepted findings" },
            { "name": "clear", "description": "Drop every accepted finding" }
        ],
        "storage": ["baseline.db", "baseline.events.jsonl"]
    })
}
