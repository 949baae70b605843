//! Review Session - the read-modify-write unit around the SRS core
//!
//! Ties the pieces together the way a request handler would: pick the next
//! due item, judge a submitted answer, advance the scheduling state, persist
//! it under the version token loaded with it, and append the audit event.
//!
//! The session owns nothing global: the store handle is passed in by the
//! caller and its lifetime belongs to the caller. One submit is exactly one
//! store round-trip cycle; on a version conflict the error surfaces and the
//! caller decides whether to reload and re-run. Nothing here retries or logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::{select_due, AnswerJudge, BinaryScheduler, Grade, SchedulingStrategy};
use crate::storage::{ReviewStore, StoreError};
use crate::vocab::{ItemInput, ReviewEvent, ReviewState, VocabItem};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Review-level error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Malformed input, rejected before the store is touched
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Store failure or version conflict
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Review result type
pub type Result<T> = std::result::Result<T, ReviewError>;

// ============================================================================
// OUTCOME
// ============================================================================

/// What a submitted answer produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    /// Judge verdict
    pub correct: bool,
    /// The expected answer, for feedback display
    pub reference: String,
    /// Interval before this answer, so callers can render the delta
    pub previous_interval_units: i64,
    /// The persisted successor state (due date, streak, ease)
    pub state: ReviewState,
    /// Version the state was saved at
    #[serde(skip)]
    pub version: u64,
}

// ============================================================================
// SESSION
// ============================================================================

/// Orchestrates judging, scheduling, and persistence over one store handle
pub struct ReviewSession<S> {
    store: S,
    judge: AnswerJudge,
    strategy: Box<dyn SchedulingStrategy>,
}

impl<S: ReviewStore> ReviewSession<S> {
    /// Create a session with the default judge and the binary strategy
    pub fn new(store: S) -> Self {
        Self {
            store,
            judge: AnswerJudge::default(),
            strategy: Box::new(BinaryScheduler::default()),
        }
    }

    /// Create a session with explicit judge and strategy
    pub fn with_parts(store: S, judge: AnswerJudge, strategy: Box<dyn SchedulingStrategy>) -> Self {
        Self {
            store,
            judge,
            strategy,
        }
    }

    /// The underlying store handle
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add a vocabulary item
    pub fn add_item(&self, input: ItemInput) -> Result<VocabItem> {
        if input.prompt.trim().is_empty() {
            return Err(ReviewError::InvalidInput("prompt must not be empty".into()));
        }
        if input.reference.trim().is_empty() {
            return Err(ReviewError::InvalidInput(
                "reference must not be empty".into(),
            ));
        }
        if !input.difficulty_weight.is_finite() || input.difficulty_weight < 0.0 {
            return Err(ReviewError::InvalidInput(format!(
                "difficulty weight must be non-negative, got {}",
                input.difficulty_weight
            )));
        }
        Ok(self.store.add_item(input)?)
    }

    /// The most urgent due item, if any
    pub fn next_item(&self, now: DateTime<Utc>) -> Result<Option<VocabItem>> {
        let mut items = self.due_items(now, 1)?;
        Ok(items.pop())
    }

    /// Up to `limit` due items, most urgent first
    pub fn due_items(&self, now: DateTime<Utc>, limit: i32) -> Result<Vec<VocabItem>> {
        if limit <= 0 {
            return Err(ReviewError::InvalidInput(format!(
                "limit must be positive, got {limit}"
            )));
        }
        let candidates = self
            .store
            .scan_candidates(&|_, state| state.is_due_at(now))?;
        select_due(&candidates, now, limit)
    }

    /// How many items are due at `now`
    pub fn due_count(&self, now: DateTime<Utc>) -> Result<i64> {
        Ok(self.store.due_count(now)?)
    }

    /// Judge an answer, advance the item's state, persist it, log the event
    ///
    /// The load-advance-save triple behaves as an atomic unit per item: the
    /// save carries the version observed at load, and a concurrent answer for
    /// the same item turns into [`StoreError::Conflict`]. That conflict is a
    /// stale read, not a failure to ignore: re-running this call performs the
    /// required fresh load and re-advance.
    pub fn submit_answer(
        &self,
        item_id: &str,
        submitted: &str,
        latency_seconds: f64,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome> {
        if item_id.trim().is_empty() {
            return Err(ReviewError::InvalidInput("item id must not be empty".into()));
        }
        if !latency_seconds.is_finite() || latency_seconds < 0.0 {
            return Err(ReviewError::InvalidInput(format!(
                "latency must be a non-negative number of seconds, got {latency_seconds}"
            )));
        }

        let item = self
            .store
            .get_item(item_id)?
            .ok_or_else(|| StoreError::NotFound(item_id.to_string()))?;

        let (state, expected_version) = match self.store.load_state(item_id)? {
            Some(versioned) => (versioned.state, Some(versioned.version)),
            None => (ReviewState::default(), None),
        };

        let correct = self.judge.judge(submitted, &item.reference);
        let next = self.strategy.advance(&state, Grade::Binary(correct), now);

        let version = self.store.save_state(item_id, &next, expected_version)?;

        self.store.append_event(&ReviewEvent {
            item_id: item.id,
            reviewed_at: now,
            was_correct: correct,
            submitted_answer: submitted.to_string(),
            latency_seconds,
        })?;

        Ok(AnswerOutcome {
            correct,
            reference: item.reference,
            previous_interval_units: state.interval_units,
            state: next,
            version,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
