//! Command-line surface

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deutsch_daily_storage::Storage;

use crate::app::{SessionOptions, Trainer};
use crate::config::Config;
use crate::decks::{DeckSource, FsDeckSource};
use crate::error::AppResult;

#[derive(Debug, Parser)]
#[command(name = "deutsch-daily", version, about = "Daily German vocabulary practice with spaced repetition")]
pub struct Cli {
    /// Directory with `<level>.json` decks [env: DECK_DIR]
    #[arg(long, global = true)]
    pub deck_dir: Option<PathBuf>,

    /// Directory for the progress database [env: DATA_DIR]
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Level to practise instead of the selected one
    #[arg(long, global = true)]
    pub level: Option<String>,

    /// Maximum cards per review session [env: SESSION_CAP]
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub cap: Option<u64>,

    /// Fixed shuffle seed [env: SHUFFLE_SEED]
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Review the flashcards due now
    Review,
    /// Fill-in-the-blank quiz
    Quiz,
    /// Read through the listening sentences
    Listen,
    /// Level overview, today's progress and streak
    Status,
    /// Select the level used by later commands; lists levels without an id
    Level { level_id: Option<String> },
    /// Clear today's completion flags
    ResetToday,
    /// Write a JSON backup of all progress
    Export {
        #[arg(default_value = "deutsch-daily-progress.json")]
        path: PathBuf,
    },
    /// Replace all progress with a JSON backup
    Import { path: PathBuf },
}

impl Cli {
    /// Command-line flags win over the environment
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.deck_dir {
            config.deck_dir = dir.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(cap) = self.cap {
            config.session_cap = usize::try_from(cap).unwrap_or(usize::MAX);
        }
        if self.seed.is_some() {
            config.shuffle_seed = self.seed;
        }
    }
}

/// Open storage and decks from `config` and run one command on stdin/stdout
pub fn run(cli: &Cli, config: &Config) -> AppResult<()> {
    let storage = Storage::new(config.db_path())?;
    let decks = FsDeckSource::new(&config.deck_dir);
    tracing::debug!(db = storage.db_path(), decks = %decks.dir().display(), "storage opened");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut trainer = Trainer::new(
        &storage,
        &decks,
        stdin.lock(),
        stdout.lock(),
        SessionOptions {
            cap: config.session_cap,
            seed: config.shuffle_seed,
        },
    );

    execute(&mut trainer, cli, &config.default_level)
}

/// Dispatch a parsed command against a trainer
pub fn execute<D, R, W>(trainer: &mut Trainer<'_, D, R, W>, cli: &Cli, default_level: &str) -> AppResult<()>
where
    D: DeckSource,
    R: BufRead,
    W: Write,
{
    let level = match &cli.level {
        Some(level) => level.clone(),
        None => trainer.current_level(default_level)?,
    };

    match &cli.command {
        Command::Review => {
            trainer.review(&level)?;
        }
        Command::Quiz => {
            trainer.quiz(&level)?;
        }
        Command::Listen => {
            trainer.listen(&level)?;
        }
        Command::Status => trainer.status(&level)?,
        Command::Level { level_id: Some(level_id) } => trainer.select_level(level_id)?,
        Command::Level { level_id: None } => {
            trainer.list_levels(&level)?;
        }
        Command::ResetToday => {
            trainer.reset_today()?;
        }
        Command::Export { path } => {
            trainer.export(path)?;
        }
        Command::Import { path } => {
            trainer.import(path)?;
        }
    }
    Ok(())
}
