//! Due-Set Selector
//!
//! Picks the cards eligible for review today: every card whose record is due,
//! uniformly shuffled, then capped. Which cards make the cut is random, not
//! ordered by how overdue they are.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::SchedulerResult;
use crate::store::SchedulingStore;
use crate::types::{Card, DueSummary};

/// Compute the capped, shuffled due set for one level
///
/// # Arguments
/// * `level_id` - Level the deck belongs to
/// * `deck_cards` - Flashcards of the level
/// * `store` - Scheduling records (read only)
/// * `now` - Epoch milliseconds
/// * `cap` - Maximum session size
/// * `rng` - Shuffle source; pass a seeded generator for reproducible runs
///
/// # Returns
/// Borrowed cards in session order. Empty means nothing is due.
pub fn compute_due_set<'a, S, R>(
    level_id: &str,
    deck_cards: &'a [Card],
    store: &S,
    now: i64,
    cap: usize,
    rng: &mut R,
) -> SchedulerResult<Vec<&'a Card>>
where
    S: SchedulingStore + ?Sized,
    R: Rng + ?Sized,
{
    let mut due = Vec::new();
    for card in deck_cards {
        if store.get(level_id, &card.id)?.is_due(now) {
            due.push(card);
        }
    }

    due.shuffle(rng);
    due.truncate(cap);
    Ok(due)
}

/// Count total and due cards without shuffling or capping
pub fn due_summary<S>(
    level_id: &str,
    deck_cards: &[Card],
    store: &S,
    now: i64,
) -> SchedulerResult<DueSummary>
where
    S: SchedulingStore + ?Sized,
{
    let mut due = 0;
    for card in deck_cards {
        if store.get(level_id, &card.id)?.is_due(now) {
            due += 1;
        }
    }
    Ok(DueSummary {
        total: deck_cards.len(),
        due,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;
    use crate::store::InMemoryStore;
    use crate::types::{SchedulingRecord, DEFAULT_SESSION_CAP, MS_PER_DAY};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    const T: i64 = 1_700_000_000_000;

    fn deck(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| Card::new(format!("c{i}"), format!("de{i}"), format!("en{i}")))
            .collect()
    }

    struct FailingStore;

    impl SchedulingStore for FailingStore {
        fn get(&self, _: &str, _: &str) -> SchedulerResult<SchedulingRecord> {
            Err(SchedulerError::Persistence("disk gone".to_string()))
        }

        fn put(&mut self, _: &str, _: &str, _: SchedulingRecord) -> SchedulerResult<()> {
            Err(SchedulerError::Persistence("disk gone".to_string()))
        }
    }

    #[test]
    fn test_fresh_deck_all_due() {
        let cards = deck(5);
        let store = InMemoryStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let due = compute_due_set("a1", &cards, &store, T, DEFAULT_SESSION_CAP, &mut rng).unwrap();
        assert_eq!(due.len(), 5);

        let ids: HashSet<&str> = due.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_excludes_future_cards() {
        let cards = deck(4);
        let mut store = InMemoryStore::new();
        store
            .put("a1", "c0", SchedulingRecord::new(2, 2.5, T + MS_PER_DAY))
            .unwrap();
        // exactly now counts as due
        store.put("a1", "c1", SchedulingRecord::new(2, 2.5, T)).unwrap();
        store
            .put("a1", "c2", SchedulingRecord::new(2, 2.5, T - 1))
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let due = compute_due_set("a1", &cards, &store, T, 30, &mut rng).unwrap();
        let ids: HashSet<&str> = due.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, HashSet::from(["c1", "c2", "c3"]));
    }

    #[test]
    fn test_other_level_records_ignored() {
        let cards = deck(2);
        let mut store = InMemoryStore::new();
        store
            .put("a2", "c0", SchedulingRecord::new(3, 2.5, T + MS_PER_DAY))
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let due = compute_due_set("a1", &cards, &store, T, 30, &mut rng).unwrap();
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn test_cap_respected() {
        let cards = deck(50);
        let store = InMemoryStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let due = compute_due_set("a1", &cards, &store, T, 30, &mut rng).unwrap();
        assert_eq!(due.len(), 30);

        let none = compute_due_set("a1", &cards, &store, T, 0, &mut rng).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_empty_deck() {
        let store = InMemoryStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let due = compute_due_set("a1", &[], &store, T, 30, &mut rng).unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn test_same_seed_same_order() {
        let cards = deck(20);
        let store = InMemoryStore::new();

        let mut rng1 = ChaCha8Rng::seed_from_u64(99);
        let mut rng2 = ChaCha8Rng::seed_from_u64(99);
        let first = compute_due_set("a1", &cards, &store, T, 30, &mut rng1).unwrap();
        let second = compute_due_set("a1", &cards, &store, T, 30, &mut rng2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffle_positions_roughly_uniform() {
        let cards = deck(4);
        let store = InMemoryStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let trials = 8_000;
        let mut counts = [[0usize; 4]; 4];

        for _ in 0..trials {
            let due = compute_due_set("a1", &cards, &store, T, 30, &mut rng).unwrap();
            for (pos, card) in due.iter().enumerate() {
                let idx: usize = card.id[1..].parse().unwrap();
                counts[idx][pos] += 1;
            }
        }

        // expected 2000 per cell
        for row in counts.iter() {
            for &count in row.iter() {
                assert!(
                    (1700..=2300).contains(&count),
                    "position frequency {} too far from uniform",
                    count
                );
            }
        }
    }

    #[test]
    fn test_store_failure_propagates() {
        let cards = deck(1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = compute_due_set("a1", &cards, &FailingStore, T, 30, &mut rng);
        assert!(matches!(result, Err(SchedulerError::Persistence(_))));
    }

    #[test]
    fn test_due_summary_counts() {
        let cards = deck(40);
        let mut store = InMemoryStore::new();
        for i in 0..10 {
            store
                .put("a1", &format!("c{i}"), SchedulingRecord::new(2, 2.5, T + 1))
                .unwrap();
        }

        let summary = due_summary("a1", &cards, &store, T).unwrap();
        assert_eq!(summary, DueSummary { total: 40, due: 30 });
    }
}
