//! Interval Scheduler - SM-2 state transitions
//!
//! Two named strategies behind one trait, selected explicitly by the caller:
//!
//! - [`BinaryScheduler`] (primary): boolean correctness, short first/second
//!   intervals (1 and 3 units), ease bonus +0.1 / penalty -0.2, and interval
//!   halving on a miss.
//! - [`QualityScheduler`] (legacy compatibility): 0-5 recall quality, the
//!   original SM-2 constants (1 and 6 units, quadratic ease delta), interval
//!   reset to the minimum on quality < 3.
//!
//! The two rules use different constants and are never merged; swapping one
//! for the other changes review cadence and must be a deliberate choice.
//!
//! `advance` is pure and total: it never fails for any well-formed state,
//! including a freshly created one with no due date yet.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::vocab::ReviewState;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Interval after the first correct answer (binary strategy)
pub const FIRST_CORRECT_INTERVAL: i64 = 1;
/// Interval after the second correct answer (binary strategy)
pub const SECOND_CORRECT_INTERVAL: i64 = 3;
/// Floor for any interval
pub const MIN_INTERVAL: i64 = 1;
/// Cap for any interval (a thousand years of minutes). Ease-driven growth is
/// exponential; without the cap a few dozen straight correct answers push
/// `round(interval × ease)` past what the calendar can represent.
pub const MAX_INTERVAL: i64 = 525_600_000;
/// Ease factor floor
pub const EASE_MIN: f64 = 1.3;
/// Ease factor cap
pub const EASE_MAX: f64 = 3.0;

/// Ease reward for a correct answer (binary strategy)
const EASE_BONUS: f64 = 0.1;
/// Ease penalty for a miss (binary strategy)
const EASE_PENALTY: f64 = 0.2;

/// Legacy first/second intervals - deliberately distinct from the binary ones
const QUALITY_FIRST_INTERVAL: i64 = 1;
const QUALITY_SECOND_INTERVAL: i64 = 6;

// ============================================================================
// GRADE
// ============================================================================

/// The recall signal fed into a strategy
///
/// Binary deployments pass the judge's verdict; the quality-scored legacy
/// surface passes the full 0-5 scale. Each strategy maps the other form the
/// way the legacy system did: a bare boolean becomes quality 5 or 0, and a
/// quality grade counts as correct iff it is at least 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Grade {
    /// Boolean verdict from the answer judge
    Binary(bool),
    /// 0-5 recall quality (values above 5 are clamped)
    Quality(u8),
}

impl Grade {
    /// Whether this grade counts as a correct recall
    pub fn is_correct(self) -> bool {
        match self {
            Grade::Binary(correct) => correct,
            Grade::Quality(q) => q >= 3,
        }
    }

    /// The grade on the 0-5 quality scale
    pub fn quality(self) -> u8 {
        match self {
            Grade::Binary(true) => 5,
            Grade::Binary(false) => 0,
            Grade::Quality(q) => q.min(5),
        }
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Time unit for `interval_units`, fixed per deployment (never mixed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    /// Duolingo-style short-cycle drilling
    #[default]
    Minutes,
    /// Classic flashcard-deck cadence
    Days,
}

impl IntervalUnit {
    /// Convert an interval count into a concrete duration
    pub fn span(self, units: i64) -> Duration {
        match self {
            IntervalUnit::Minutes => Duration::minutes(units),
            IntervalUnit::Days => Duration::days(units),
        }
    }
}

/// Tunables for the binary strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Deployment time unit
    pub unit: IntervalUnit,
    /// Interval after the first correct answer
    pub first_correct_interval: i64,
    /// Interval after the second correct answer
    pub second_correct_interval: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            unit: IntervalUnit::Minutes,
            first_correct_interval: FIRST_CORRECT_INTERVAL,
            second_correct_interval: SECOND_CORRECT_INTERVAL,
        }
    }
}

// ============================================================================
// STRATEGY TRAIT
// ============================================================================

/// A pure interval/ease update rule
///
/// Implementations must be deterministic and total: the same `(state, grade,
/// now)` always yields the same output, and no well-formed input may panic.
pub trait SchedulingStrategy: Send + Sync {
    /// Compute the successor state after one answer
    fn advance(&self, state: &ReviewState, grade: Grade, now: DateTime<Utc>) -> ReviewState;
}

// ============================================================================
// BINARY STRATEGY (primary)
// ============================================================================

/// Boolean-correctness SM-2 variant, the primary strategy
///
/// On a miss the interval is halved rather than reset to the minimum; a
/// learner who knew a word for hours should not restart from one unit over a
/// single typo.
#[derive(Debug, Clone, Default)]
pub struct BinaryScheduler {
    config: SchedulerConfig,
}

impl BinaryScheduler {
    /// Create a scheduler with the given config
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// The active config
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl SchedulingStrategy for BinaryScheduler {
    fn advance(&self, state: &ReviewState, grade: Grade, now: DateTime<Utc>) -> ReviewState {
        let mut next = state.clone();

        if grade.is_correct() {
            next.repetition_count = state.repetition_count + 1;
            next.interval_units = match next.repetition_count {
                1 => self.config.first_correct_interval,
                2 => self.config.second_correct_interval,
                // Growth uses the pre-update ease factor
                _ => round_half_away(state.interval_units as f64 * state.ease_factor),
            };
            next.streak = state.streak + 1;
            next.ease_factor = clamp_ease(state.ease_factor + EASE_BONUS);
        } else {
            next.repetition_count = 0;
            next.streak = 0;
            next.interval_units = state.interval_units / 2;
            next.ease_factor = clamp_ease(state.ease_factor - EASE_PENALTY);
        }

        next.interval_units = next.interval_units.clamp(MIN_INTERVAL, MAX_INTERVAL);
        next.next_due_at = Some(saturating_due(now, self.config.unit.span(next.interval_units)));
        next.last_reviewed_at = Some(now);
        next
    }
}

// ============================================================================
// QUALITY STRATEGY (legacy compatibility)
// ============================================================================

/// Quality-scored SM-2 variant kept for the legacy grading surface
///
/// Constants differ from the binary strategy (second interval 6, ease delta
/// `0.1 - (5-q)(0.08 + (5-q)*0.02)`), and a failed recall resets the interval
/// to the minimum instead of halving it.
#[derive(Debug, Clone, Default)]
pub struct QualityScheduler {
    unit: IntervalUnit,
}

impl QualityScheduler {
    /// Create a scheduler using the given time unit
    pub fn new(unit: IntervalUnit) -> Self {
        Self { unit }
    }
}

impl SchedulingStrategy for QualityScheduler {
    fn advance(&self, state: &ReviewState, grade: Grade, now: DateTime<Utc>) -> ReviewState {
        let quality = grade.quality();
        let mut next = state.clone();

        if quality < 3 {
            next.repetition_count = 0;
            next.streak = 0;
            next.interval_units = MIN_INTERVAL;
        } else {
            next.repetition_count = state.repetition_count + 1;
            next.interval_units = match next.repetition_count {
                1 => QUALITY_FIRST_INTERVAL,
                2 => QUALITY_SECOND_INTERVAL,
                _ => round_half_away(state.interval_units as f64 * state.ease_factor),
            };
            next.streak = state.streak + 1;
        }

        // Legacy rule adjusts ease on every answer, failures included
        let q = quality as f64;
        let delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
        next.ease_factor = clamp_ease(state.ease_factor + delta);

        next.interval_units = next.interval_units.clamp(MIN_INTERVAL, MAX_INTERVAL);
        next.next_due_at = Some(saturating_due(now, self.unit.span(next.interval_units)));
        next.last_reviewed_at = Some(now);
        next
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Round half away from zero, the SM-2 convention (`f64::round` semantics)
fn round_half_away(value: f64) -> i64 {
    value.round() as i64
}

/// Clamp applied after every ease update, never before
fn clamp_ease(ease: f64) -> f64 {
    ease.clamp(EASE_MIN, EASE_MAX)
}

/// Due dates saturate at the end of the calendar instead of overflowing
fn saturating_due(now: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    now.checked_add_signed(span)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-15T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_first_correct_answer() {
        let scheduler = BinaryScheduler::default();
        let next = scheduler.advance(&ReviewState::default(), Grade::Binary(true), epoch());

        assert_eq!(next.repetition_count, 1);
        assert_eq!(next.streak, 1);
        assert_eq!(next.interval_units, FIRST_CORRECT_INTERVAL);
        assert!((next.ease_factor - 2.6).abs() < 1e-9);
        assert_eq!(next.next_due_at, Some(epoch() + Duration::minutes(1)));
        assert_eq!(next.last_reviewed_at, Some(epoch()));
    }

    #[test]
    fn test_second_correct_answer() {
        let scheduler = BinaryScheduler::default();
        let first = scheduler.advance(&ReviewState::default(), Grade::Binary(true), epoch());
        let second = scheduler.advance(&first, Grade::Binary(true), epoch());

        assert_eq!(second.repetition_count, 2);
        assert_eq!(second.interval_units, SECOND_CORRECT_INTERVAL);
        assert!((second.ease_factor - 2.7).abs() < 1e-9);
    }

    #[test]
    fn test_third_correct_multiplies_by_ease() {
        let scheduler = BinaryScheduler::default();
        let state = ReviewState {
            interval_units: 3,
            ease_factor: 2.7,
            repetition_count: 2,
            streak: 2,
            next_due_at: Some(epoch()),
            last_reviewed_at: Some(epoch()),
        };
        let next = scheduler.advance(&state, Grade::Binary(true), epoch());

        // round(3 * 2.7) = 8, pre-update ease
        assert_eq!(next.repetition_count, 3);
        assert_eq!(next.interval_units, 8);
        assert!((next.ease_factor - 2.8).abs() < 1e-9);
    }

    #[test]
    fn test_miss_halves_interval_and_resets_counters() {
        let scheduler = BinaryScheduler::default();
        let state = ReviewState {
            interval_units: 10,
            ease_factor: 2.0,
            repetition_count: 3,
            streak: 3,
            next_due_at: Some(epoch()),
            last_reviewed_at: Some(epoch()),
        };
        let next = scheduler.advance(&state, Grade::Binary(false), epoch());

        assert_eq!(next.interval_units, 5);
        assert!((next.ease_factor - 1.8).abs() < 1e-9);
        assert_eq!(next.repetition_count, 0);
        assert_eq!(next.streak, 0);
    }

    #[test]
    fn test_miss_at_minimum_interval_stays_at_minimum() {
        let scheduler = BinaryScheduler::default();
        let next = scheduler.advance(&ReviewState::default(), Grade::Binary(false), epoch());
        assert_eq!(next.interval_units, MIN_INTERVAL);
    }

    #[test]
    fn test_ease_clamped_at_cap_and_floor() {
        let scheduler = BinaryScheduler::default();
        let high = ReviewState {
            ease_factor: 2.95,
            ..Default::default()
        };
        assert_eq!(
            scheduler.advance(&high, Grade::Binary(true), epoch()).ease_factor,
            EASE_MAX
        );

        let low = ReviewState {
            ease_factor: 1.4,
            ..Default::default()
        };
        assert_eq!(
            scheduler.advance(&low, Grade::Binary(false), epoch()).ease_factor,
            EASE_MIN
        );
    }

    #[test]
    fn test_days_unit_schedules_in_days() {
        let scheduler = BinaryScheduler::new(SchedulerConfig {
            unit: IntervalUnit::Days,
            ..Default::default()
        });
        let next = scheduler.advance(&ReviewState::default(), Grade::Binary(true), epoch());
        assert_eq!(next.next_due_at, Some(epoch() + Duration::days(1)));
    }

    #[test]
    fn test_quality_grade_maps_to_correctness() {
        assert!(Grade::Quality(3).is_correct());
        assert!(!Grade::Quality(2).is_correct());
        assert_eq!(Grade::Binary(true).quality(), 5);
        assert_eq!(Grade::Binary(false).quality(), 0);
        assert_eq!(Grade::Quality(9).quality(), 5);
    }

    #[test]
    fn test_quality_scheduler_uses_legacy_constants() {
        let scheduler = QualityScheduler::default();
        let first = scheduler.advance(&ReviewState::default(), Grade::Quality(4), epoch());
        assert_eq!(first.interval_units, QUALITY_FIRST_INTERVAL);
        assert_eq!(first.repetition_count, 1);

        let second = scheduler.advance(&first, Grade::Quality(4), epoch());
        // Second interval is 6, not the binary strategy's 3
        assert_eq!(second.interval_units, QUALITY_SECOND_INTERVAL);
        assert_ne!(second.interval_units, SECOND_CORRECT_INTERVAL);
    }

    #[test]
    fn test_quality_ease_delta() {
        let scheduler = QualityScheduler::default();
        let state = ReviewState::default();

        // q=5: +0.1, q=4: +0.0, q=3: -0.14
        let q5 = scheduler.advance(&state, Grade::Quality(5), epoch());
        assert!((q5.ease_factor - 2.6).abs() < 1e-9);
        let q4 = scheduler.advance(&state, Grade::Quality(4), epoch());
        assert!((q4.ease_factor - 2.5).abs() < 1e-9);
        let q3 = scheduler.advance(&state, Grade::Quality(3), epoch());
        assert!((q3.ease_factor - 2.36).abs() < 1e-9);
    }

    #[test]
    fn test_quality_failure_resets_interval_to_minimum() {
        let scheduler = QualityScheduler::default();
        let state = ReviewState {
            interval_units: 40,
            ease_factor: 2.0,
            repetition_count: 5,
            streak: 5,
            next_due_at: Some(epoch()),
            last_reviewed_at: Some(epoch()),
        };
        let next = scheduler.advance(&state, Grade::Quality(0), epoch());

        assert_eq!(next.interval_units, MIN_INTERVAL);
        assert_eq!(next.repetition_count, 0);
        assert_eq!(next.streak, 0);
        // q=0 delta is -0.8, clamped at the floor from 2.0 - 0.8 = 1.2
        assert_eq!(next.ease_factor, EASE_MIN);
    }

    #[test]
    fn test_advance_is_total_for_fresh_state() {
        // No due date, zero reps: both strategies and both outcomes
        let fresh = ReviewState::default();
        for grade in [Grade::Binary(true), Grade::Binary(false), Grade::Quality(0), Grade::Quality(5)] {
            let b = BinaryScheduler::default().advance(&fresh, grade, epoch());
            let q = QualityScheduler::default().advance(&fresh, grade, epoch());
            for next in [b, q] {
                assert!(next.interval_units >= MIN_INTERVAL);
                assert!(next.ease_factor >= EASE_MIN && next.ease_factor <= EASE_MAX);
                assert!(next.next_due_at.is_some());
            }
        }
    }

    #[test]
    fn test_long_correct_run_saturates_instead_of_overflowing() {
        // Exponential growth reaches the calendar's edge within a few dozen
        // straight correct answers (and well under twenty in days mode);
        // the interval must peg at the cap and the due date at MAX_UTC.
        for unit in [IntervalUnit::Minutes, IntervalUnit::Days] {
            let strategies: [Box<dyn SchedulingStrategy>; 2] = [
                Box::new(BinaryScheduler::new(SchedulerConfig {
                    unit,
                    ..Default::default()
                })),
                Box::new(QualityScheduler::new(unit)),
            ];
            for strategy in strategies {
                let mut state = ReviewState::default();
                let mut now = epoch();
                for _ in 0..200 {
                    state = strategy.advance(&state, Grade::Binary(true), now);
                    assert!(state.interval_units >= MIN_INTERVAL);
                    assert!(state.interval_units <= MAX_INTERVAL);
                    now = state.next_due_at.unwrap();
                }
                assert_eq!(state.interval_units, MAX_INTERVAL);
                assert_eq!(state.next_due_at, Some(DateTime::<Utc>::MAX_UTC));
            }
        }
    }

    #[test]
    fn test_advance_at_calendar_edge_is_total() {
        // Reviewing at the saturated due date must still not overflow
        let scheduler = BinaryScheduler::default();
        let state = ReviewState {
            interval_units: MAX_INTERVAL,
            ease_factor: EASE_MAX,
            repetition_count: 30,
            streak: 30,
            next_due_at: Some(DateTime::<Utc>::MAX_UTC),
            last_reviewed_at: Some(DateTime::<Utc>::MAX_UTC),
        };
        let next = scheduler.advance(&state, Grade::Binary(true), DateTime::<Utc>::MAX_UTC);
        assert_eq!(next.interval_units, MAX_INTERVAL);
        assert_eq!(next.next_due_at, Some(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn test_advance_is_deterministic() {
        let scheduler = BinaryScheduler::default();
        let state = ReviewState {
            interval_units: 7,
            ease_factor: 2.2,
            repetition_count: 4,
            streak: 4,
            next_due_at: Some(epoch()),
            last_reviewed_at: Some(epoch()),
        };
        let a = scheduler.advance(&state, Grade::Binary(true), epoch());
        let b = scheduler.advance(&state, Grade::Binary(true), epoch());
        assert_eq!(a, b);
    }
}
