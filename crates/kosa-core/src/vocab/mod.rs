//! Vocabulary module - Core types and data structures
//!
//! Implements the review data model:
//! - Immutable vocabulary items (prompt/reference pairs)
//! - Per-item SM-2 scheduling state
//! - Append-only review events for audit and export

mod item;

pub use item::{ItemInput, ReviewEvent, ReviewState, VocabItem};
