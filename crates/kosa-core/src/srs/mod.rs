//! SRS Module - The scheduling core
//!
//! A simplified SM-2 discipline in three pure pieces:
//! - [`AnswerJudge`]: exact/fuzzy correctness of a typed answer
//! - [`SchedulingStrategy`]: interval/ease update after each answer, as two
//!   named strategies (boolean-correctness primary, quality-scored legacy)
//! - [`select_due`]: deterministic ordering of the due set for a session
//!
//! Everything here is side-effect-free and total over well-formed inputs;
//! persistence and orchestration live in `storage` and `review`.

mod judge;
mod scheduler;
mod selector;

pub use judge::{AnswerJudge, FUZZY_THRESHOLD};
pub use scheduler::{
    BinaryScheduler, Grade, IntervalUnit, QualityScheduler, SchedulerConfig, SchedulingStrategy,
    EASE_MAX, EASE_MIN, FIRST_CORRECT_INTERVAL, MAX_INTERVAL, MIN_INTERVAL,
    SECOND_CORRECT_INTERVAL,
};
pub use selector::select_due;
