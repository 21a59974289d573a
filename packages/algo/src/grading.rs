//! Grading Engine
//!
//! Leitner boxes with an SM-2 style ease factor:
//! - The grade moves the card between boxes and nudges its ease
//! - The next interval is `ceil(base_interval[box] * ease)` days
//! - The due point is always recomputed from the grading moment, so a
//!   failed card is scheduled into a later session instead of being
//!   re-shown in the current one
//!
//! Every function here is pure; persisting the result is the caller's job.

use crate::error::SchedulerResult;
use crate::sanitize::{clamp_box, clamp_ease, sanitize_record};
use crate::types::{
    Grade, SchedulingRecord, BASE_INTERVAL_DAYS, GOOD_EASE_CAP, MAX_BOX, MAX_EASE, MIN_BOX,
    MIN_EASE, MS_PER_DAY,
};

const AGAIN_EASE_PENALTY: f64 = 0.2;
const HARD_EASE_PENALTY: f64 = 0.05;
const GOOD_EASE_BONUS: f64 = 0.05;
const EASY_EASE_BONUS: f64 = 0.1;

/// Compute the next scheduling state for a graded card
///
/// # Arguments
/// * `record` - Current state (default record for unseen cards)
/// * `grade` - Learner feedback
/// * `now` - Grading moment, epoch milliseconds
///
/// `due` is strictly later than `now` for every timestamp up to
/// `i64::MAX - 192 days`; beyond that it saturates at `i64::MAX`.
pub fn grade(record: &SchedulingRecord, grade: Grade, now: i64) -> SchedulingRecord {
    let current = sanitize_record(*record);
    let b = current.leitner_box;
    let e = current.ease;

    let (next_box, next_ease) = match grade {
        Grade::Again => (
            b.saturating_sub(1).max(MIN_BOX),
            (e - AGAIN_EASE_PENALTY).max(MIN_EASE),
        ),
        Grade::Hard => (b.max(MIN_BOX), (e - HARD_EASE_PENALTY).max(MIN_EASE)),
        Grade::Good => ((b + 1).min(MAX_BOX), (e + GOOD_EASE_BONUS).min(GOOD_EASE_CAP)),
        Grade::Easy => ((b + 2).min(MAX_BOX), (e + EASY_EASE_BONUS).min(MAX_EASE)),
    };

    let leitner_box = clamp_box(next_box);
    let ease = clamp_ease(next_ease);
    let days = interval_days(leitner_box, ease);

    SchedulingRecord {
        leitner_box,
        ease,
        due: now.saturating_add(i64::from(days) * MS_PER_DAY),
    }
}

/// Grade from a raw 1-4 signal
///
/// Fails with `InvalidGradeSignal` instead of falling through to a default.
pub fn grade_signal(
    record: &SchedulingRecord,
    signal: i64,
    now: i64,
) -> SchedulerResult<SchedulingRecord> {
    let g = Grade::try_from(signal)?;
    Ok(grade(record, g, now))
}

/// Interval in whole days for a box/ease pair
pub fn interval_days(leitner_box: u8, ease: f64) -> u32 {
    let base = BASE_INTERVAL_DAYS[usize::from(clamp_box(leitner_box))];
    (f64::from(base) * clamp_ease(ease)).ceil() as u32
}

/// Days each grade would schedule, in `Grade::ALL` order
pub fn preview_intervals(record: &SchedulingRecord) -> [u32; 4] {
    Grade::ALL.map(|g| {
        let next = grade(record, g, 0);
        (next.due / MS_PER_DAY) as u32
    })
}
