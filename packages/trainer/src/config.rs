use std::path::PathBuf;

use deutsch_daily_algo::DEFAULT_SESSION_CAP;

/// Database file inside `data_dir`
pub const DB_FILE_NAME: &str = "progress.db";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `<level>.json` decks
    pub deck_dir: PathBuf,
    /// Directory holding the progress database
    pub data_dir: PathBuf,
    pub session_cap: usize,
    pub shuffle_seed: Option<u64>,
    pub default_level: String,
    pub log_level: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let deck_dir = lookup("DECK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".deutsch-daily"));

        let session_cap = lookup("SESSION_CAP")
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|cap| *cap > 0)
            .unwrap_or(DEFAULT_SESSION_CAP);

        let shuffle_seed = lookup("SHUFFLE_SEED").and_then(|value| value.parse::<u64>().ok());

        let default_level = lookup("DEFAULT_LEVEL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "a1".to_string());

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "warn".to_string());

        let file_logs = lookup("ENABLE_FILE_LOGS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let log_dir = lookup("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"));

        Self {
            deck_dir,
            data_dir,
            session_cap,
            shuffle_seed,
            default_level,
            log_level,
            file_logs,
            log_dir,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}
