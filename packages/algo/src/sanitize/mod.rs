//! Data Sanitization
//!
//! Keeps scheduling records inside their valid ranges.
//!
//! Records normally come out of the grading engine already clamped, but the
//! store also receives data from outside (imported backups, older database
//! rows), so every entry point runs through these helpers first.

use crate::types::{SchedulingRecord, DEFAULT_EASE, MAX_BOX, MAX_EASE, MIN_BOX, MIN_EASE};

/// 检查 ease 是否为无效值 (NaN 或 Inf)
pub fn is_invalid_ease(ease: f64) -> bool {
    ease.is_nan() || ease.is_infinite()
}

/// Clamp a box index into [1, 6]
pub fn clamp_box(leitner_box: u8) -> u8 {
    leitner_box.clamp(MIN_BOX, MAX_BOX)
}

/// Clamp an ease into [1.3, 3.2]; non-finite values fall back to the default
pub fn clamp_ease(ease: f64) -> f64 {
    if is_invalid_ease(ease) {
        return DEFAULT_EASE;
    }
    ease.clamp(MIN_EASE, MAX_EASE)
}

/// 清理调度记录，确保所有字段都在有效范围内
///
/// `due` is left untouched: any timestamp, including negative ones, is a
/// valid point in time and simply means "already due".
pub fn sanitize_record(record: SchedulingRecord) -> SchedulingRecord {
    SchedulingRecord {
        leitner_box: clamp_box(record.leitner_box),
        ease: clamp_ease(record.ease),
        due: record.due,
    }
}
