//! Level deck loading
//!
//! A level id maps to `<deck_dir>/<level>.json`. Ids are restricted to ASCII
//! letters, digits, `-` and `_` so they can never leave the deck directory
//! and never contain the review key separator.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use deutsch_daily_algo::Deck;

use crate::error::{AppError, AppResult};

pub trait DeckSource {
    fn load(&self, level_id: &str) -> AppResult<Deck>;

    /// Level ids this source can load, sorted
    fn levels(&self) -> AppResult<Vec<String>>;
}

pub fn is_valid_level_id(level_id: &str) -> bool {
    !level_id.is_empty()
        && level_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Clone)]
pub struct FsDeckSource {
    dir: PathBuf,
}

impl FsDeckSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn deck_path(&self, level_id: &str) -> AppResult<PathBuf> {
        if !is_valid_level_id(level_id) {
            return Err(AppError::InvalidLevel(level_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", level_id)))
    }
}

impl DeckSource for FsDeckSource {
    fn load(&self, level_id: &str) -> AppResult<Deck> {
        let path = self.deck_path(level_id)?;

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(AppError::DeckNotFound {
                    level: level_id.to_string(),
                    path,
                })
            }
            Err(err) => return Err(err.into()),
        };

        let deck = Deck::from_json(&raw).map_err(|source| AppError::DeckFormat {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(
            level = level_id,
            flashcards = deck.flashcards.len(),
            quiz = deck.quiz.len(),
            listen = deck.listen.len(),
            "deck loaded"
        );
        Ok(deck)
    }

    fn levels(&self) -> AppResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut levels = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_level_id(stem) {
                    levels.push(stem.to_string());
                }
            }
        }
        levels.sort();
        Ok(levels)
    }
}
