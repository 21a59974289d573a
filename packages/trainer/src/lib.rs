//! # deutsch-daily
//!
//! Terminal front end for the Deutsch Daily trainer: flashcard review with
//! spaced repetition, a fill-in quiz, listening sentences, a daily streak,
//! and JSON backups.

pub mod app;
pub mod cli;
pub mod config;
pub mod decks;
pub mod error;
pub mod logging;

pub use app::{PassOutcome, ReviewOutcome, SessionOptions, Trainer};
pub use config::Config;
pub use decks::{DeckSource, FsDeckSource};
pub use error::{AppError, AppResult};
