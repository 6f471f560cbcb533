//! SQLite DDL for the Rota stores.
//!
//! All `CREATE TABLE` / `CREATE INDEX` statements live here so they are
//! reviewable and testable in isolation.

use rusqlite::Connection;

/// Bumped when the DDL changes shape. Stamped into `schema_meta` on first
/// open so future releases can migrate.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Complete DDL for the Rota database.
///
/// Uses `IF NOT EXISTS` throughout so `apply_schema` is idempotent.
pub(crate) const SCHEMA_SQL: &str = r#"
-- WAL mode: readers proceed while a write is in flight.
PRAGMA journal_mode = WAL;

-- Schema version tracking.
CREATE TABLE IF NOT EXISTS schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Recurring task templates, one row per TaskDefinition.
-- frequency holds the kind ('daily' | 'weekly' | 'monthly'); weekly_day is
-- set exactly when frequency = 'weekly'. Decode enforces the pairing.
CREATE TABLE IF NOT EXISTS task_definitions (
    id               TEXT PRIMARY KEY,   -- ULID
    venue_id         TEXT NOT NULL,
    name             TEXT NOT NULL,
    area             TEXT NOT NULL DEFAULT '',
    frequency        TEXT NOT NULL,
    weekly_day       TEXT,               -- 'sunday'..'saturday'
    shift            TEXT NOT NULL,      -- 'opening' | 'midday' | 'closing'
    scheduled_time   TEXT,               -- 'HH:MM:SS'
    method           TEXT NOT NULL DEFAULT '',
    requires_reading INTEGER NOT NULL DEFAULT 0,
    responsible_role TEXT NOT NULL DEFAULT 'any',
    auto_tick_source TEXT,
    sort_order       INTEGER NOT NULL DEFAULT 0,
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,      -- RFC 3339
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_definitions_venue_active
    ON task_definitions(venue_id, is_active, sort_order);

-- Append-only completion log, one row per satisfied task-day instance.
-- day is the calendar day being satisfied ('YYYY-MM-DD'), decoupled from
-- the completed_at instant.
CREATE TABLE IF NOT EXISTS completion_records (
    id            TEXT PRIMARY KEY,      -- ULID
    definition_id TEXT NOT NULL,
    venue_id      TEXT NOT NULL,
    day           TEXT NOT NULL,
    completed_by  TEXT NOT NULL,
    completed_at  TEXT NOT NULL,         -- RFC 3339
    reading       REAL,
    evidence      TEXT,
    notes         TEXT,
    is_auto       INTEGER NOT NULL DEFAULT 0,
    signed_off_by TEXT,
    signed_off_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_completions_venue_day
    ON completion_records(venue_id, day);
CREATE INDEX IF NOT EXISTS idx_completions_definition_day
    ON completion_records(definition_id, day);

-- At most one synthetic record per (definition, day). INSERT OR IGNORE
-- against this index is what makes append_auto_once atomic under
-- concurrent polling. Manual records are exempt.
CREATE UNIQUE INDEX IF NOT EXISTS idx_completions_auto_once
    ON completion_records(definition_id, day) WHERE is_auto = 1;
"#;

/// Apply the full schema to an open connection.
///
/// Safe to call multiple times. Seeds the schema version into
/// `schema_meta` if this is a fresh database.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    let version_str = CURRENT_SCHEMA_VERSION.to_string();
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', ?1)",
        rusqlite::params![version_str],
    )?;

    Ok(())
}

/// Read the stamped schema version. `None` on a database that predates
/// version stamping.
pub(crate) fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_meta WHERE key = 'schema_version'")?;
    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().ok())
        }
        None => Ok(None),
    }
}
