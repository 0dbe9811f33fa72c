// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

#[test]
fn open_creates_schema_and_stamps_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("swarm.db");
    let db = SwarmDb::open(&path).unwrap();

    let version: i64 = db
        .conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap();
    assert_eq!(version, SCHEMA_VERSION);

    let tables: i64 = db
        .conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
             AND name IN ('tasks','heartbeats','session')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 3);
}

#[test]
fn reopen_existing_database_is_fine() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("swarm.db");
    drop(SwarmDb::open(&path).unwrap());
    SwarmDb::open(&path).unwrap();
}

#[test]
fn incompatible_schema_version_is_refused() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("swarm.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.pragma_update(None, "user_version", 99).unwrap();
    }
    let err = SwarmDb::open(&path).unwrap_err();
    assert!(matches!(
        err,
        SwarmError::SchemaVersion {
            found: 99,
            expected: SCHEMA_VERSION
        }
    ));
}

#[test]
fn journal_mode_is_wal() {
    let temp = TempDir::new().unwrap();
    let db = SwarmDb::open(&temp.path().join("swarm.db")).unwrap();
    let mode: String = db
        .conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn vacuum_runs() {
    let temp = TempDir::new().unwrap();
    let db = SwarmDb::open(&temp.path().join("swarm.db")).unwrap();
    db.vacuum().unwrap();
}
