//! Database Migrations
//!
//! Schema migration definitions for the review store.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: items, versioned review state, event log",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Index due scans and per-item event lookups",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS vocab_items (
    id TEXT PRIMARY KEY,
    prompt TEXT NOT NULL,
    reference TEXT NOT NULL,
    part_of_speech TEXT,
    example_sentence TEXT,
    difficulty_weight REAL NOT NULL DEFAULT 1.0 CHECK (difficulty_weight >= 0.0),
    created_at TEXT NOT NULL
);

-- One row per reviewed item, replaced whole on every save. The version
-- column is the optimistic-concurrency token that serializes concurrent
-- answers for the same item.
CREATE TABLE IF NOT EXISTS review_states (
    item_id TEXT PRIMARY KEY REFERENCES vocab_items(id) ON DELETE CASCADE,
    interval_units INTEGER NOT NULL DEFAULT 1 CHECK (interval_units >= 1),
    ease_factor REAL NOT NULL DEFAULT 2.5,
    repetition_count INTEGER NOT NULL DEFAULT 0,
    streak INTEGER NOT NULL DEFAULT 0,
    next_due_at TEXT,
    last_reviewed_at TEXT,
    version INTEGER NOT NULL DEFAULT 1
);

-- Append-only audit log, one row per submitted answer
CREATE TABLE IF NOT EXISTS review_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id TEXT NOT NULL REFERENCES vocab_items(id) ON DELETE CASCADE,
    reviewed_at TEXT NOT NULL,
    was_correct INTEGER NOT NULL,
    submitted_answer TEXT NOT NULL,
    latency_seconds REAL NOT NULL DEFAULT 0.0
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Indexes for the hot read paths
const MIGRATION_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_review_states_next_due ON review_states(next_due_at);
CREATE INDEX IF NOT EXISTS idx_review_events_item ON review_events(item_id, reviewed_at);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::debug!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
