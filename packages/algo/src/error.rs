//! Scheduler error types

use thiserror::Error;

/// Errors surfaced by the scheduling core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// Grade signal outside 1..=4
    #[error("invalid grade signal {0}, expected 1-4")]
    InvalidGradeSignal(i64),

    /// Backing store failed to read or write a record
    #[error("persistence error: {0}")]
    Persistence(String),

    /// `grade_current` called before `next_card` produced a card
    #[error("no card is currently being reviewed")]
    NoActiveCard,
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
