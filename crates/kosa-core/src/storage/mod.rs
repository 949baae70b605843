//! Storage Module
//!
//! The store boundary for scheduling state:
//! - [`ReviewStore`] trait: read-one/write-one/scan semantics plus an
//!   optimistic-concurrency token on state writes
//! - SQLite implementation with versioned full-state replace
//! - Numbered schema migrations
//!
//! Per-item serialization is the one hard consistency requirement: a
//! `save_state` carries the version observed at `load_state`, and a mismatch
//! comes back as [`StoreError::Conflict`] with the prior row left intact.
//! Scans may observe a slightly stale due set; that is fine for selection.

mod migrations;
mod sqlite;

pub use migrations::{apply_migrations, Migration, MIGRATIONS};
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::vocab::{ItemInput, ReviewEvent, ReviewState, VocabItem};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Store error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Item not found
    #[error("item not found: {0}")]
    NotFound(String),
    /// Version token mismatch on a state save (stale read)
    #[error("version conflict for item {item_id}: expected {expected:?}, found {found:?}")]
    Conflict {
        /// Item whose state write was rejected
        item_id: String,
        /// Version the caller loaded, `None` for a first insert
        expected: Option<u64>,
        /// Version currently in the store, `None` if the row vanished
        found: Option<u64>,
    },
    /// Invalid timestamp
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    /// Initialization error
    #[error("initialization error: {0}")]
    Init(String),
}

/// Store result type
pub type Result<T> = std::result::Result<T, StoreError>;

// ============================================================================
// VERSIONED STATE
// ============================================================================

/// A scheduling state together with its optimistic-concurrency token
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedState {
    /// The stored state
    pub state: ReviewState,
    /// Monotonic per-item version, bumped on every save
    pub version: u64,
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Predicate over a candidate pair, applied during a scan
pub type CandidateFilter<'a> = dyn Fn(&VocabItem, &ReviewState) -> bool + 'a;

/// Durable keyed storage for items, scheduling state, and the review log
///
/// Implementations must make `save_state` atomic per item: either the whole
/// state replaces the row at the expected version, or nothing changes and
/// the call fails. Nothing here retries; retry policy belongs to the caller.
pub trait ReviewStore: Send + Sync {
    /// Create a vocabulary item, assigning it a fresh id
    fn add_item(&self, input: ItemInput) -> Result<VocabItem>;

    /// Fetch a single item
    fn get_item(&self, item_id: &str) -> Result<Option<VocabItem>>;

    /// Load the scheduling state and its version token, if it exists
    fn load_state(&self, item_id: &str) -> Result<Option<VersionedState>>;

    /// Replace the scheduling state whole, compare-and-swap on the version
    ///
    /// `expected_version` is the token from `load_state`, or `None` when the
    /// item has never been reviewed (insert). Returns the new version.
    fn save_state(
        &self,
        item_id: &str,
        state: &ReviewState,
        expected_version: Option<u64>,
    ) -> Result<u64>;

    /// Append a review event to the audit log (never mutated afterwards)
    fn append_event(&self, event: &ReviewEvent) -> Result<()>;

    /// Scan items with their state (default state for never-reviewed items),
    /// keeping pairs the filter accepts
    fn scan_candidates(&self, filter: &CandidateFilter<'_>) -> Result<Vec<(VocabItem, ReviewState)>>;

    /// Review events for one item, oldest first
    fn events_for_item(&self, item_id: &str) -> Result<Vec<ReviewEvent>>;

    /// How many items are due at `now` (inclusive threshold)
    fn due_count(&self, now: DateTime<Utc>) -> Result<i64>;
}
