use std::path::PathBuf;

use deutsch_daily_algo::SchedulerError;
use deutsch_daily_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("no deck for level '{level}' at {}", path.display())]
    DeckNotFound { level: String, path: PathBuf },

    #[error("deck {} is not valid: {source}", path.display())]
    DeckFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid level id '{0}'")]
    InvalidLevel(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
