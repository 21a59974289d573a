//! Review Session
//!
//! `SessionQueue` is a snapshot of the due set drained front to back. It never
//! reorders or re-inserts: a failed card is rescheduled by the grading engine
//! and comes back in a later session.
//!
//! `ReviewSession` wires a queue to a store for one level, so the caller only
//! has to pull cards and report grades.

use std::collections::VecDeque;

use crate::error::{SchedulerError, SchedulerResult};
use crate::grading;
use crate::store::SchedulingStore;
use crate::types::{Card, Grade, SchedulingRecord};

// ==================== Session Queue ====================

/// Ordered, destructively consumed sequence of borrowed cards
#[derive(Clone, Debug, Default)]
pub struct SessionQueue<'a> {
    cards: VecDeque<&'a Card>,
}

impl<'a> SessionQueue<'a> {
    /// Capture the due set; later changes to it do not affect the queue
    pub fn start<I>(due_set: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        Self {
            cards: due_set.into_iter().collect(),
        }
    }

    /// Cards left in the session
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl<'a> Iterator for SessionQueue<'a> {
    type Item = &'a Card;

    /// Pop the next card; `None` once the session is complete, and on every
    /// call after that
    fn next(&mut self) -> Option<&'a Card> {
        self.cards.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cards.len(), Some(self.cards.len()))
    }
}

// ==================== Review Session ====================

/// One bounded pass through a level's due set
pub struct ReviewSession<'a, S: SchedulingStore> {
    level_id: String,
    queue: SessionQueue<'a>,
    store: S,
    current: Option<&'a Card>,
    reviewed: usize,
}

impl<'a, S: SchedulingStore> ReviewSession<'a, S> {
    pub fn new(level_id: impl Into<String>, queue: SessionQueue<'a>, store: S) -> Self {
        Self {
            level_id: level_id.into(),
            queue,
            store,
            current: None,
            reviewed: 0,
        }
    }

    /// Advance to the next card. `None` signals the session is complete.
    pub fn next_card(&mut self) -> Option<&'a Card> {
        self.current = self.queue.next();
        self.current
    }

    /// Current scheduling state of the card on screen
    pub fn current_record(&self) -> SchedulerResult<SchedulingRecord> {
        let card = self.current.ok_or(SchedulerError::NoActiveCard)?;
        self.store.get(&self.level_id, &card.id)
    }

    /// Grade the card on screen and persist its new state
    ///
    /// The card is released and counted as reviewed even when the store
    /// fails, so the session can move on; the error tells the caller progress
    /// may not be saved.
    pub fn grade_current(&mut self, grade: Grade, now: i64) -> SchedulerResult<SchedulingRecord> {
        let card = self.current.take().ok_or(SchedulerError::NoActiveCard)?;
        self.reviewed += 1;

        let record = self.store.get(&self.level_id, &card.id)?;
        let next = grading::grade(&record, grade, now);
        self.store.put(&self.level_id, &card.id, next)?;
        Ok(next)
    }

    /// Cards still queued (excluding the one on screen)
    pub fn remaining(&self) -> usize {
        self.queue.remaining()
    }

    /// Cards graded so far
    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    /// Queue drained and nothing left to grade
    pub fn is_complete(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::types::MS_PER_DAY;

    const T: i64 = 1_700_000_000_000;

    fn cards() -> Vec<Card> {
        vec![Card::new("a", "der Hund", "dog"), Card::new("b", "die Katze", "cat")]
    }

    #[test]
    fn test_queue_drains_in_order_then_stays_empty() {
        let cards = cards();
        let mut queue = SessionQueue::start(cards.iter());
        assert_eq!(queue.remaining(), 2);
        assert_eq!(queue.next().map(|c| c.id.as_str()), Some("a"));
        assert_eq!(queue.next().map(|c| c.id.as_str()), Some("b"));
        assert_eq!(queue.next(), None);
        assert_eq!(queue.next(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_is_a_snapshot() {
        let cards = cards();
        let mut due: Vec<&Card> = cards.iter().collect();
        let mut queue = SessionQueue::start(due.clone());
        due.clear();
        assert_eq!(queue.remaining(), 2);
        assert!(queue.next().is_some());
    }

    #[test]
    fn test_session_grades_and_persists() {
        let cards = cards();
        let mut store = InMemoryStore::new();
        {
            let queue = SessionQueue::start(cards.iter());
            let mut session = ReviewSession::new("a1", queue, &mut store);
            let first = session.next_card().unwrap();
            assert_eq!(first.id, "a");
            assert_eq!(session.remaining(), 1);

            let record = session.grade_current(Grade::Easy, T).unwrap();
            assert_eq!(record.leitner_box, 3);
            assert_eq!(record.due, T + 19 * MS_PER_DAY);
            assert_eq!(session.reviewed(), 1);
            assert!(!session.is_complete());

            session.next_card().unwrap();
            session.grade_current(Grade::Again, T).unwrap();
            assert!(session.next_card().is_none());
            assert!(session.is_complete());
        }

        assert_eq!(store.get("a1", "a").unwrap().leitner_box, 3);
        assert_eq!(store.get("a1", "b").unwrap().leitner_box, 1);
        assert_eq!(store.get("a1", "b").unwrap().due, T + 3 * MS_PER_DAY);
    }

    #[test]
    fn test_grade_without_card_fails() {
        let mut session = ReviewSession::new("a1", SessionQueue::default(), InMemoryStore::new());
        assert_eq!(
            session.grade_current(Grade::Good, T),
            Err(SchedulerError::NoActiveCard)
        );
        assert!(session.next_card().is_none());
        assert!(session.is_complete());
    }

    #[test]
    fn test_card_cannot_be_graded_twice() {
        let cards = cards();
        let mut session =
            ReviewSession::new("a1", SessionQueue::start(cards.iter()), InMemoryStore::new());
        session.next_card();
        session.grade_current(Grade::Good, T).unwrap();
        assert_eq!(
            session.grade_current(Grade::Good, T),
            Err(SchedulerError::NoActiveCard)
        );
    }

    #[test]
    fn test_current_record_of_unseen_card_is_default() {
        let cards = cards();
        let mut session =
            ReviewSession::new("a1", SessionQueue::start(cards.iter()), InMemoryStore::new());
        assert!(session.current_record().is_err());
        session.next_card();
        assert_eq!(session.current_record().unwrap(), SchedulingRecord::default());
    }

    /// Reads succeed, every write fails
    struct FailingPut;

    impl SchedulingStore for FailingPut {
        fn get(&self, _level_id: &str, _card_id: &str) -> SchedulerResult<SchedulingRecord> {
            Ok(SchedulingRecord::default())
        }

        fn put(&mut self, _: &str, _: &str, _: SchedulingRecord) -> SchedulerResult<()> {
            Err(SchedulerError::Persistence("disk full".to_string()))
        }
    }

    struct FailingGet;

    impl SchedulingStore for FailingGet {
        fn get(&self, _level_id: &str, _card_id: &str) -> SchedulerResult<SchedulingRecord> {
            Err(SchedulerError::Persistence("unreadable".to_string()))
        }

        fn put(&mut self, _: &str, _: &str, _: SchedulingRecord) -> SchedulerResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_releases_card_and_session_moves_on() {
        let cards = cards();
        let mut session = ReviewSession::new("a1", SessionQueue::start(cards.iter()), FailingPut);

        session.next_card().unwrap();
        assert_eq!(
            session.grade_current(Grade::Good, T),
            Err(SchedulerError::Persistence("disk full".to_string()))
        );
        assert_eq!(session.reviewed(), 1);
        assert_eq!(
            session.grade_current(Grade::Good, T),
            Err(SchedulerError::NoActiveCard)
        );

        assert_eq!(session.next_card().map(|c| c.id.as_str()), Some("b"));
        assert!(session.grade_current(Grade::Easy, T).is_err());
        assert_eq!(session.reviewed(), 2);
        assert!(session.next_card().is_none());
        assert!(session.is_complete());
    }

    #[test]
    fn test_failed_read_counts_like_failed_write() {
        let cards = cards();
        let mut session = ReviewSession::new("a1", SessionQueue::start(cards.iter()), FailingGet);

        session.next_card().unwrap();
        assert!(matches!(
            session.grade_current(Grade::Hard, T),
            Err(SchedulerError::Persistence(_))
        ));
        assert_eq!(session.reviewed(), 1);
        assert_eq!(session.remaining(), 1);
    }
}
