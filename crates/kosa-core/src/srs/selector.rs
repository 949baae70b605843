//! Due Selector - which items a session should drill, and in what order
//!
//! Read-only and deterministic: the same candidate snapshot and `now` always
//! produce the same ordered list, so selection can run concurrently with
//! scheduling updates for other items and only ever observe a slightly stale
//! due set.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::review::ReviewError;
use crate::vocab::{ReviewState, VocabItem};

/// Select up to `limit` due items from a candidate snapshot
///
/// An item is due iff it has never been reviewed (`next_due_at` absent) or
/// its due time has arrived (inclusive). Ordering, most urgent first:
///
/// 1. never-reviewed and overdue items before items due exactly at `now`
/// 2. ascending `next_due_at`, absent treated as infinitely overdue
/// 3. descending `difficulty_weight`
/// 4. ascending `ease_factor`
/// 5. ascending item id, so ties stay stable across calls
///
/// `limit <= 0` is an input error.
pub fn select_due(
    candidates: &[(VocabItem, ReviewState)],
    now: DateTime<Utc>,
    limit: i32,
) -> Result<Vec<VocabItem>, ReviewError> {
    if limit <= 0 {
        return Err(ReviewError::InvalidInput(format!(
            "limit must be positive, got {limit}"
        )));
    }

    let mut due: Vec<&(VocabItem, ReviewState)> = candidates
        .iter()
        .filter(|(_, state)| state.is_due_at(now))
        .collect();

    due.sort_by(|(item_a, state_a), (item_b, state_b)| {
        overdue_rank(state_a, now)
            .cmp(&overdue_rank(state_b, now))
            .then_with(|| cmp_due_at(state_a.next_due_at, state_b.next_due_at))
            .then_with(|| item_b.difficulty_weight.total_cmp(&item_a.difficulty_weight))
            .then_with(|| state_a.ease_factor.total_cmp(&state_b.ease_factor))
            .then_with(|| item_a.id.cmp(&item_b.id))
    });

    Ok(due
        .into_iter()
        .take(limit as usize)
        .map(|(item, _)| item.clone())
        .collect())
}

/// 0 = never reviewed or strictly overdue, 1 = due exactly now
fn overdue_rank(state: &ReviewState, now: DateTime<Utc>) -> u8 {
    match state.next_due_at {
        None => 0,
        Some(due) if due < now => 0,
        Some(_) => 1,
    }
}

/// Ascending due time with absent sorting first (infinitely overdue)
fn cmp_due_at(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

// ============================================================================
// TESTS
// ============================================================================
