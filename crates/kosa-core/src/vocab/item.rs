//! Vocabulary Item - The fundamental unit of review
//!
//! Each item pairs a source-language prompt with its reference translation.
//! Items are immutable once created; the mutable part of an item's life is
//! its [`ReviewState`], which only the interval scheduler may rewrite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// VOCAB ITEM
// ============================================================================

/// An immutable vocabulary unit
///
/// The `reference` field is the expected answer the judge compares against.
/// `difficulty_weight` is a selection tie-break only and is never touched by
/// scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabItem {
    /// Stable identifier (UUID v4 for items created through [`ItemInput`])
    pub id: String,
    /// Source-language text shown to the learner
    pub prompt: String,
    /// Target-language text, the expected answer
    pub reference: String,
    /// Part of speech (noun, verb, ...)
    pub part_of_speech: Option<String>,
    /// Example sentence using the word
    pub example_sentence: Option<String>,
    /// Non-negative selection tie-break weight (higher = picked earlier)
    pub difficulty_weight: f64,
    /// When the item was created
    pub created_at: DateTime<Utc>,
}

impl VocabItem {
    /// Create a new item with default weight
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            reference: reference.into(),
            part_of_speech: None,
            example_sentence: None,
            difficulty_weight: 1.0,
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// REVIEW STATE
// ============================================================================

/// SM-2 scheduling state, one-to-one with a [`VocabItem`]
///
/// Invariants maintained by the scheduler:
/// - `ease_factor` stays within `[EASE_MIN, EASE_MAX]`
/// - `interval_units >= 1`
/// - `repetition_count == 0` and `streak == 0` after any miss
///
/// State is replaced whole on every update (never field-patched) so the
/// store's version token can detect lost updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewState {
    /// Current interval in the deployment's time unit (minutes or days)
    pub interval_units: i64,
    /// Growth multiplier for the interval, clamped to `[1.3, 3.0]`
    pub ease_factor: f64,
    /// Successful repetitions since the last miss
    pub repetition_count: i32,
    /// Consecutive-correct counter, reset on any miss
    pub streak: i32,
    /// Next scheduled review; `None` means never reviewed (always due).
    /// The threshold is inclusive: an item due exactly now IS due.
    pub next_due_at: Option<DateTime<Utc>>,
    /// When the item was last answered
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl Default for ReviewState {
    fn default() -> Self {
        Self {
            interval_units: 1,
            ease_factor: 2.5,
            repetition_count: 0,
            streak: 0,
            next_due_at: None,
            last_reviewed_at: None,
        }
    }
}

impl ReviewState {
    /// Check whether this state is due at `now` (inclusive threshold)
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.next_due_at.map(|t| t <= now).unwrap_or(true)
    }
}

// ============================================================================
// REVIEW EVENT
// ============================================================================

/// An append-only review fact, one per submitted answer
///
/// Events exist for audit and export. The scheduler never consults them;
/// everything it needs lives in [`ReviewState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    /// Item the answer was submitted for
    pub item_id: String,
    /// When the answer was submitted
    pub reviewed_at: DateTime<Utc>,
    /// Judge verdict for the submitted answer
    pub was_correct: bool,
    /// The raw text the learner typed
    pub submitted_answer: String,
    /// Seconds between presentation and submission
    pub latency_seconds: f64,
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// Input for adding a vocabulary item
///
/// Uses `deny_unknown_fields` to reject malformed payloads at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemInput {
    /// Source-language text
    pub prompt: String,
    /// Expected answer
    pub reference: String,
    /// Part of speech
    #[serde(default)]
    pub part_of_speech: Option<String>,
    /// Example sentence
    #[serde(default)]
    pub example_sentence: Option<String>,
    /// Selection tie-break weight; defaults to 1.0
    #[serde(default = "default_weight")]
    pub difficulty_weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Default for ItemInput {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            reference: String::new(),
            part_of_speech: None,
            example_sentence: None,
            difficulty_weight: 1.0,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fresh_state_defaults() {
        let state = ReviewState::default();
        assert_eq!(state.interval_units, 1);
        assert_eq!(state.ease_factor, 2.5);
        assert_eq!(state.repetition_count, 0);
        assert_eq!(state.streak, 0);
        assert!(state.next_due_at.is_none());
        assert!(state.last_reviewed_at.is_none());
    }

    #[test]
    fn test_never_reviewed_is_due() {
        let state = ReviewState::default();
        assert!(state.is_due_at(Utc::now()));
    }

    #[test]
    fn test_due_threshold_is_inclusive() {
        let now = Utc::now();
        let state = ReviewState {
            next_due_at: Some(now),
            ..Default::default()
        };
        assert!(state.is_due_at(now));
        assert!(!state.is_due_at(now - Duration::seconds(1)));
    }

    #[test]
    fn test_item_input_deny_unknown_fields() {
        let json = r#"{"prompt": "apple", "reference": "apel"}"#;
        let result: Result<ItemInput, _> = serde_json::from_str(json);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().difficulty_weight, 1.0);

        let json_with_unknown = r#"{"prompt": "apple", "reference": "apel", "easeFactor": 9.0}"#;
        let result: Result<ItemInput, _> = serde_json::from_str(json_with_unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_state_serde_roundtrip_keeps_camel_case() {
        let state = ReviewState {
            next_due_at: Some(Utc::now()),
            ..Default::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("intervalUnits"));
        assert!(json.contains("easeFactor"));
        let back: ReviewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
