//! # deutsch-daily-algo - spaced-repetition core
//!
//! Pure Rust scheduling for the Deutsch Daily vocabulary trainer:
//!
//! - **Grading Engine** - Leitner boxes (1-6) with an SM-2 style ease factor
//! - **Due-Set Selector** - shuffled, capped set of cards due right now
//! - **Session Queue** - one bounded pass through the due set
//! - **Scheduling Store** - get/put trait for per-card state
//!
//! ## 模块结构
//!
//! - [`grading`] - next state for a graded card
//! - [`due_set`] - due-set computation and deck summary
//! - [`session`] - session queue and review session
//! - [`store`] - store trait and in-memory implementation
//! - [`deck`] - deck content model (flashcards, quiz, listening)
//! - [`sanitize`] - range clamping for records
//! - [`types`] - shared types and constants
//!
//! ## 使用示例
//!
//! ```rust
//! use deutsch_daily_algo::{compute_due_set, session_rng, Card, Grade, InMemoryStore, ReviewSession, SessionQueue};
//!
//! let cards = vec![Card::new("haus", "das Haus", "the house")];
//! let mut store = InMemoryStore::new();
//! let mut rng = session_rng(Some(42));
//! let now = 1_700_000_000_000;
//!
//! let due = compute_due_set("a1", &cards, &store, now, 30, &mut rng).unwrap();
//! let mut session = ReviewSession::new("a1", SessionQueue::start(due), &mut store);
//! while session.next_card().is_some() {
//!     session.grade_current(Grade::Good, now).unwrap();
//! }
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod deck;
pub mod due_set;
pub mod error;
pub mod grading;
pub mod sanitize;
pub mod session;
pub mod store;
pub mod types;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// 重新导出
// ============================================================================

pub use types::*;

pub use deck::{normalize_answer, Deck, DeckMeta, ListenItem, QuizItem};
pub use due_set::{compute_due_set, due_summary};
pub use error::{SchedulerError, SchedulerResult};
pub use grading::{grade, grade_signal, interval_days, preview_intervals};
pub use session::{ReviewSession, SessionQueue};
pub use store::{InMemoryStore, SchedulingStore};

/// Shuffle source for due-set selection
pub type SessionRng = ChaCha8Rng;

/// Create the session RNG; without a seed it is seeded from the clock
pub fn session_rng(seed: Option<u64>) -> SessionRng {
    let seed = seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    ChaCha8Rng::seed_from_u64(seed)
}
