//! Common Types and Constants
//!
//! Shared data structures used across the scheduler modules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};

// ==================== Constants ====================

/// Base review interval in days, indexed by Leitner box (index 0 unused)
pub const BASE_INTERVAL_DAYS: [u32; 7] = [0, 1, 3, 7, 14, 30, 60];

/// Lowest Leitner box
pub const MIN_BOX: u8 = 1;

/// Highest Leitner box
pub const MAX_BOX: u8 = 6;

/// Ease floor
pub const MIN_EASE: f64 = 1.3;

/// Ease ceiling (reachable only through `Grade::Easy`)
pub const MAX_EASE: f64 = 3.2;

/// Ease ceiling for `Grade::Good`
pub const GOOD_EASE_CAP: f64 = 3.0;

/// Ease assigned to a card that has never been graded
pub const DEFAULT_EASE: f64 = 2.5;

/// Milliseconds per day
pub const MS_PER_DAY: i64 = 86_400_000;

/// Default number of cards in one review session
pub const DEFAULT_SESSION_CAP: usize = 30;

/// Separator between level and card id in flattened keys
pub const KEY_SEPARATOR: char = ':';

// ==================== Card ====================

/// A flashcard as shipped in deck content
///
/// Owned by the deck; the scheduler only ever borrows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Identifier, unique within a level
    pub id: String,
    /// Front side (German)
    pub de: String,
    /// Back side (English)
    pub en: String,
    /// Optional usage note shown with the back side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Card {
    pub fn new(id: impl Into<String>, de: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            de: de.into(),
            en: en.into(),
            note: None,
        }
    }
}

// ==================== Scheduling Record ====================

/// Per-card scheduling state, keyed by (level, card id)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulingRecord {
    /// Leitner box in [1, 6]
    #[serde(rename = "box")]
    pub leitner_box: u8,
    /// Interval multiplier in [1.3, 3.2]
    pub ease: f64,
    /// Epoch milliseconds at/after which the card is due
    pub due: i64,
}

impl Default for SchedulingRecord {
    fn default() -> Self {
        Self {
            leitner_box: MIN_BOX,
            ease: DEFAULT_EASE,
            due: 0,
        }
    }
}

impl SchedulingRecord {
    pub fn new(leitner_box: u8, ease: f64, due: i64) -> Self {
        Self {
            leitner_box,
            ease,
            due,
        }
    }

    /// Whether the card is eligible for review at `now`
    pub fn is_due(&self, now: i64) -> bool {
        self.due <= now
    }
}

/// State of a card that has never been graded: `{box: 1, ease: 2.5, due: 0}`
pub fn default_record() -> SchedulingRecord {
    SchedulingRecord::default()
}

// ==================== Grade ====================

/// Learner feedback after revealing a card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// Forgot the card
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Numeric signal (1-4)
    pub fn signal(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }
}

impl TryFrom<i64> for Grade {
    type Error = SchedulerError;

    fn try_from(signal: i64) -> SchedulerResult<Self> {
        match signal {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            other => Err(SchedulerError::InvalidGradeSignal(other)),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ==================== Review Key ====================

/// Composite store key: the same card id in two levels is two entities
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReviewKey {
    pub level_id: String,
    pub card_id: String,
}

impl ReviewKey {
    pub fn new(level_id: impl Into<String>, card_id: impl Into<String>) -> Self {
        Self {
            level_id: level_id.into(),
            card_id: card_id.into(),
        }
    }

    /// Parse a flattened `"level:card"` key. Splits on the first separator,
    /// so card ids may themselves contain `:`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (level_id, card_id) = raw.split_once(KEY_SEPARATOR)?;
        if level_id.is_empty() || card_id.is_empty() {
            return None;
        }
        Some(Self::new(level_id, card_id))
    }
}

impl fmt::Display for ReviewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.level_id, KEY_SEPARATOR, self.card_id)
    }
}

// ==================== Due Summary ====================

/// Deck overview for the current moment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSummary {
    /// Cards in the deck
    pub total: usize,
    /// Cards eligible for review (uncapped)
    pub due: usize,
}
