//! SQLite Review Store
//!
//! Split reader/writer connections behind mutexes so the store is
//! `Send + Sync` and callers can share it as `Arc<SqliteStore>`. All state
//! writes go through the single writer; WAL mode keeps readers unblocked.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use super::{CandidateFilter, Result, ReviewStore, StoreError, VersionedState};
use crate::vocab::{ItemInput, ReviewEvent, ReviewState, VocabItem};

/// SQLite-backed [`ReviewStore`]
pub struct SqliteStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl SqliteStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }

    /// Open (or create) a store at `db_path`, defaulting to the platform
    /// data directory
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("dev", "kosa", "kosa").ok_or_else(|| {
                    StoreError::Init("could not determine project directories".to_string())
                })?;
                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                data_dir.join("kosa.db")
            }
        };

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Migrations run on the writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    fn writer(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StoreError::Init("writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StoreError::Init("reader lock poisoned".into()))
    }

    fn row_to_item(row: &Row<'_>) -> rusqlite::Result<(VocabItem, String)> {
        let created_at: String = row.get("created_at")?;
        Ok((
            VocabItem {
                id: row.get("id")?,
                prompt: row.get("prompt")?,
                reference: row.get("reference")?,
                part_of_speech: row.get("part_of_speech")?,
                example_sentence: row.get("example_sentence")?,
                difficulty_weight: row.get("difficulty_weight")?,
                // Placeholder, replaced once the timestamp text is parsed
                created_at: Utc::now(),
            },
            created_at,
        ))
    }

    fn item_from_row(row: &Row<'_>) -> Result<VocabItem> {
        let (mut item, created_at) = Self::row_to_item(row).map_err(StoreError::Database)?;
        item.created_at = parse_ts(&created_at)?;
        Ok(item)
    }

    fn state_from_row(row: &Row<'_>) -> Result<ReviewState> {
        let next_due_at: Option<String> = row.get("next_due_at")?;
        let last_reviewed_at: Option<String> = row.get("last_reviewed_at")?;
        Ok(ReviewState {
            interval_units: row.get("interval_units")?,
            ease_factor: row.get("ease_factor")?,
            repetition_count: row.get("repetition_count")?,
            streak: row.get("streak")?,
            next_due_at: next_due_at.as_deref().map(parse_ts).transpose()?,
            last_reviewed_at: last_reviewed_at.as_deref().map(parse_ts).transpose()?,
        })
    }

    /// Version currently stored for an item, if any
    fn stored_version(conn: &Connection, item_id: &str) -> Result<Option<u64>> {
        let version: Option<i64> = conn
            .query_row(
                "SELECT version FROM review_states WHERE item_id = ?1",
                params![item_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version.map(|v| v as u64))
    }
}

impl ReviewStore for SqliteStore {
    fn add_item(&self, input: ItemInput) -> Result<VocabItem> {
        let item = VocabItem {
            id: Uuid::new_v4().to_string(),
            prompt: input.prompt,
            reference: input.reference,
            part_of_speech: input.part_of_speech,
            example_sentence: input.example_sentence,
            difficulty_weight: input.difficulty_weight,
            created_at: Utc::now(),
        };

        let writer = self.writer()?;
        writer.execute(
            "INSERT INTO vocab_items (
                id, prompt, reference, part_of_speech, example_sentence,
                difficulty_weight, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.id,
                item.prompt,
                item.reference,
                item.part_of_speech,
                item.example_sentence,
                item.difficulty_weight,
                item.created_at.to_rfc3339(),
            ],
        )?;

        Ok(item)
    }

    fn get_item(&self, item_id: &str) -> Result<Option<VocabItem>> {
        let reader = self.reader()?;
        let row = reader
            .query_row(
                "SELECT id, prompt, reference, part_of_speech, example_sentence,
                        difficulty_weight, created_at
                 FROM vocab_items WHERE id = ?1",
                params![item_id],
                Self::row_to_item,
            )
            .optional()?;
        drop(reader);

        match row {
            None => Ok(None),
            Some((mut item, created_at)) => {
                item.created_at = parse_ts(&created_at)?;
                Ok(Some(item))
            }
        }
    }

    fn load_state(&self, item_id: &str) -> Result<Option<VersionedState>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT interval_units, ease_factor, repetition_count, streak,
                    next_due_at, last_reviewed_at, version
             FROM review_states WHERE item_id = ?1",
        )?;
        let row: Option<(i64, f64, i32, i32, Option<String>, Option<String>, i64)> = stmt
            .query_row(params![item_id], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })
            .optional()?;

        let Some((interval_units, ease_factor, repetition_count, streak, due, last, version)) = row
        else {
            return Ok(None);
        };

        Ok(Some(VersionedState {
            state: ReviewState {
                interval_units,
                ease_factor,
                repetition_count,
                streak,
                next_due_at: due.as_deref().map(parse_ts).transpose()?,
                last_reviewed_at: last.as_deref().map(parse_ts).transpose()?,
            },
            version: version as u64,
        }))
    }

    fn save_state(
        &self,
        item_id: &str,
        state: &ReviewState,
        expected_version: Option<u64>,
    ) -> Result<u64> {
        let next_due = state.next_due_at.map(|t| t.to_rfc3339());
        let last_reviewed = state.last_reviewed_at.map(|t| t.to_rfc3339());

        let writer = self.writer()?;
        match expected_version {
            // First review: the state row must not exist yet
            None => {
                let inserted = writer.execute(
                    "INSERT INTO review_states (
                        item_id, interval_units, ease_factor, repetition_count,
                        streak, next_due_at, last_reviewed_at, version
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)
                    ON CONFLICT(item_id) DO NOTHING",
                    params![
                        item_id,
                        state.interval_units,
                        state.ease_factor,
                        state.repetition_count,
                        state.streak,
                        next_due,
                        last_reviewed,
                    ],
                )?;
                if inserted == 0 {
                    let found = Self::stored_version(&writer, item_id)?;
                    tracing::warn!(item_id, ?found, "state insert lost a race");
                    return Err(StoreError::Conflict {
                        item_id: item_id.to_string(),
                        expected: None,
                        found,
                    });
                }
                Ok(1)
            }
            // Subsequent reviews: single-row compare-and-swap on the version
            Some(expected) => {
                let updated = writer.execute(
                    "UPDATE review_states SET
                        interval_units = ?2, ease_factor = ?3, repetition_count = ?4,
                        streak = ?5, next_due_at = ?6, last_reviewed_at = ?7,
                        version = version + 1
                     WHERE item_id = ?1 AND version = ?8",
                    params![
                        item_id,
                        state.interval_units,
                        state.ease_factor,
                        state.repetition_count,
                        state.streak,
                        next_due,
                        last_reviewed,
                        expected as i64,
                    ],
                )?;
                if updated == 0 {
                    let found = Self::stored_version(&writer, item_id)?;
                    tracing::warn!(item_id, expected, ?found, "stale state write rejected");
                    return Err(StoreError::Conflict {
                        item_id: item_id.to_string(),
                        expected: Some(expected),
                        found,
                    });
                }
                Ok(expected + 1)
            }
        }
    }

    fn append_event(&self, event: &ReviewEvent) -> Result<()> {
        let writer = self.writer()?;
        writer.execute(
            "INSERT INTO review_events (
                item_id, reviewed_at, was_correct, submitted_answer, latency_seconds
            ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.item_id,
                event.reviewed_at.to_rfc3339(),
                event.was_correct,
                event.submitted_answer,
                event.latency_seconds,
            ],
        )?;
        Ok(())
    }

    fn scan_candidates(&self, filter: &CandidateFilter<'_>) -> Result<Vec<(VocabItem, ReviewState)>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT i.id, i.prompt, i.reference, i.part_of_speech, i.example_sentence,
                    i.difficulty_weight, i.created_at,
                    s.interval_units, s.ease_factor, s.repetition_count, s.streak,
                    s.next_due_at, s.last_reviewed_at
             FROM vocab_items i
             LEFT JOIN review_states s ON s.item_id = i.id
             ORDER BY i.id",
        )?;

        type CandidateRow = (
            VocabItem,
            String,
            Option<i64>,
            Option<f64>,
            Option<i32>,
            Option<i32>,
            Option<String>,
            Option<String>,
        );
        let rows = stmt.query_map([], |row| {
            let (item, created_at) = Self::row_to_item(row)?;
            Ok((
                item,
                created_at,
                row.get("interval_units")?,
                row.get("ease_factor")?,
                row.get("repetition_count")?,
                row.get("streak")?,
                row.get("next_due_at")?,
                row.get("last_reviewed_at")?,
            ))
        })?;

        let mut candidates = Vec::new();
        for row in rows {
            let (mut item, created_at, interval, ease, reps, streak, due, last): CandidateRow =
                row?;
            item.created_at = parse_ts(&created_at)?;

            // Items never reviewed have no state row yet; they carry the
            // default state and are therefore always due.
            let state = match interval {
                None => ReviewState::default(),
                Some(interval_units) => ReviewState {
                    interval_units,
                    ease_factor: ease.unwrap_or(2.5),
                    repetition_count: reps.unwrap_or(0),
                    streak: streak.unwrap_or(0),
                    next_due_at: due.as_deref().map(parse_ts).transpose()?,
                    last_reviewed_at: last.as_deref().map(parse_ts).transpose()?,
                },
            };

            if filter(&item, &state) {
                candidates.push((item, state));
            }
        }

        Ok(candidates)
    }

    fn events_for_item(&self, item_id: &str) -> Result<Vec<ReviewEvent>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT item_id, reviewed_at, was_correct, submitted_answer, latency_seconds
             FROM review_events WHERE item_id = ?1
             ORDER BY reviewed_at ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![item_id], |row| {
            let reviewed_at: String = row.get(1)?;
            Ok((
                ReviewEvent {
                    item_id: row.get(0)?,
                    reviewed_at: Utc::now(),
                    was_correct: row.get(2)?,
                    submitted_answer: row.get(3)?,
                    latency_seconds: row.get(4)?,
                },
                reviewed_at,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (mut event, reviewed_at) = row?;
            event.reviewed_at = parse_ts(&reviewed_at)?;
            events.push(event);
        }
        Ok(events)
    }

    fn due_count(&self, now: DateTime<Utc>) -> Result<i64> {
        let reader = self.reader()?;
        let count = reader.query_row(
            "SELECT COUNT(*)
             FROM vocab_items i
             LEFT JOIN review_states s ON s.item_id = i.id
             WHERE s.next_due_at IS NULL OR s.next_due_at <= ?1",
            params![now.to_rfc3339()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Parse an RFC 3339 column back into UTC
fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidTimestamp(s.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================
