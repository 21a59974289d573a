//! Deck Content
//!
//! A level's deck as shipped in `data/<level>.json`. The scheduler itself only
//! reads `flashcards`; quiz and listening items are consumed by the front end.

use serde::{Deserialize, Serialize};

use crate::types::Card;

/// Deck metadata shown in the level overview
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckMeta {
    pub title: String,
    #[serde(default)]
    pub includes: Vec<String>,
}

/// Fill-in quiz question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    /// Prompt in German
    #[serde(rename = "promptDE")]
    pub prompt_de: String,
    /// English hint shown under the prompt
    #[serde(rename = "hintEN", default)]
    pub hint_en: String,
    /// Accepted answers; the first one is shown as the solution
    pub answers: Vec<String>,
}

impl QuizItem {
    /// Whether `answer` matches any accepted answer after normalization
    pub fn accepts(&self, answer: &str) -> bool {
        let given = normalize_answer(answer);
        self.answers.iter().any(|a| normalize_answer(a) == given)
    }

    pub fn solution(&self) -> Option<&str> {
        self.answers.first().map(String::as_str)
    }
}

/// Listening sentence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenItem {
    pub de: String,
    pub en: String,
}

/// Everything a level ships with
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub meta: DeckMeta,
    #[serde(default)]
    pub flashcards: Vec<Card>,
    #[serde(default)]
    pub quiz: Vec<QuizItem>,
    #[serde(default)]
    pub listen: Vec<ListenItem>,
}

impl Deck {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Lowercase, trim, and collapse inner whitespace
pub fn normalize_answer(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
