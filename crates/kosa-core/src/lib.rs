//! # Kosa Core
//!
//! Spaced-repetition core for flashcard-style vocabulary review:
//!
//! - **SM-2 scheduling**: interval/ease updates after every answer, as two
//!   named strategies (boolean-correctness primary, 0-5 quality legacy)
//! - **Fuzzy answer judging**: trim/case-fold plus Levenshtein ratio, so a
//!   one-letter typo still counts
//! - **Due selection**: deterministic most-overdue-first ordering over a
//!   candidate snapshot
//! - **Versioned persistence**: SQLite store with a per-item
//!   compare-and-swap token, so two concurrent answers for the same item
//!   can never silently lose an update
//!
//! This is a library, not a service: HTTP/CLI/session bookkeeping belong to
//! the caller. The scheduling core is pure; the store round-trip is the only
//! place a call can block or fail.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kosa_core::{ItemInput, ReviewSession, SqliteStore};
//! use chrono::Utc;
//!
//! let store = SqliteStore::new(None)?;
//! let session = ReviewSession::new(store);
//!
//! session.add_item(ItemInput {
//!     prompt: "apple".into(),
//!     reference: "apel".into(),
//!     ..Default::default()
//! })?;
//!
//! if let Some(item) = session.next_item(Utc::now())? {
//!     let outcome = session.submit_answer(&item.id, "apel", 1.8, Utc::now())?;
//!     println!("correct: {}, next due: {:?}", outcome.correct, outcome.state.next_due_at);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): compile SQLite in instead of linking the
//!   system library

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod review;
pub mod srs;
pub mod storage;
pub mod vocab;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Vocabulary types
pub use vocab::{ItemInput, ReviewEvent, ReviewState, VocabItem};

// SRS core
pub use srs::{
    select_due, AnswerJudge, BinaryScheduler, Grade, IntervalUnit, QualityScheduler,
    SchedulerConfig, SchedulingStrategy, EASE_MAX, EASE_MIN, FIRST_CORRECT_INTERVAL,
    FUZZY_THRESHOLD, MAX_INTERVAL, MIN_INTERVAL, SECOND_CORRECT_INTERVAL,
};

// Storage layer
pub use storage::{ReviewStore, SqliteStore, StoreError, VersionedState};

// Session orchestration
pub use review::{AnswerOutcome, ReviewError, ReviewSession};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        AnswerJudge, AnswerOutcome, BinaryScheduler, Grade, IntervalUnit, ItemInput,
        QualityScheduler, ReviewError, ReviewEvent, ReviewSession, ReviewState, ReviewStore,
        SchedulerConfig, SchedulingStrategy, SqliteStore, StoreError, VocabItem,
    };
}
