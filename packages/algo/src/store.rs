//! Card Scheduling State Store
//!
//! The store is the sole owner of scheduling records. The scheduler never
//! touches ambient state: callers construct a store at startup and pass it
//! by reference into `compute_due_set` and `ReviewSession`.

use std::collections::HashMap;

use crate::error::SchedulerResult;
use crate::types::{ReviewKey, SchedulingRecord};

/// Persistent get/put of scheduling records keyed by (level, card)
///
/// Implementations must give read-your-writes consistency. A missing key is
/// not an error: `get` returns `SchedulingRecord::default()` without writing
/// anything back.
pub trait SchedulingStore {
    fn get(&self, level_id: &str, card_id: &str) -> SchedulerResult<SchedulingRecord>;

    fn put(
        &mut self,
        level_id: &str,
        card_id: &str,
        record: SchedulingRecord,
    ) -> SchedulerResult<()>;
}

impl<S: SchedulingStore + ?Sized> SchedulingStore for &mut S {
    fn get(&self, level_id: &str, card_id: &str) -> SchedulerResult<SchedulingRecord> {
        (**self).get(level_id, card_id)
    }

    fn put(
        &mut self,
        level_id: &str,
        card_id: &str,
        record: SchedulingRecord,
    ) -> SchedulerResult<()> {
        (**self).put(level_id, card_id, record)
    }
}

/// Volatile store, used by tests and as a fallback when no database is open
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    records: HashMap<ReviewKey, SchedulingRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cards that have been graded at least once
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SchedulingStore for InMemoryStore {
    fn get(&self, level_id: &str, card_id: &str) -> SchedulerResult<SchedulingRecord> {
        let key = ReviewKey::new(level_id, card_id);
        Ok(self.records.get(&key).copied().unwrap_or_default())
    }

    fn put(
        &mut self,
        level_id: &str,
        card_id: &str,
        record: SchedulingRecord,
    ) -> SchedulerResult<()> {
        self.records.insert(ReviewKey::new(level_id, card_id), record);
        Ok(())
    }
}
