//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: events and records
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id               TEXT PRIMARY KEY,
        name             TEXT NOT NULL,
        icon             TEXT NOT NULL DEFAULT '',
        color            INTEGER NOT NULL,
        category         TEXT NOT NULL,
        created_at       INTEGER NOT NULL,      -- ms since epoch
        is_custom        INTEGER NOT NULL DEFAULT 0,
        is_quick_record  INTEGER NOT NULL DEFAULT 0,
        attributes       JSON NOT NULL DEFAULT '[]',
        group_name       TEXT NOT NULL DEFAULT 'default'
    );

    CREATE TABLE IF NOT EXISTS records (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        event_id         TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        timestamp        INTEGER NOT NULL,      -- ms since epoch
        note             TEXT NOT NULL DEFAULT '',
        attributes       JSON NOT NULL DEFAULT '{}'
    );

    CREATE INDEX IF NOT EXISTS idx_records_event ON records(event_id);
    CREATE INDEX IF NOT EXISTS idx_records_timestamp ON records(timestamp);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
