//! Terminal front end
//!
//! `Trainer` drives the daily activities over any line-based reader and
//! writer, so the same code serves stdin/stdout and in-memory buffers.
//! Scheduling records go through a `SchedulingStore`; by default that is the
//! SQLite progress table of the given `Storage`.

use std::io::{BufRead, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use deutsch_daily_algo::{
    compute_due_set, due_summary, preview_intervals, session_rng, Card, Deck, Grade, ReviewSession,
    SchedulerError, SchedulingRecord, SchedulingStore, SessionQueue,
};
use deutsch_daily_storage::{
    export_snapshot, import_snapshot, Activity, DayCompletion, ImportSummary, ProgressSnapshot,
    Storage,
};

use crate::decks::DeckSource;
use crate::error::AppResult;

const QUIT: &str = "q";

type Clock<'s> = Box<dyn Fn() -> DateTime<Utc> + 's>;

/// Session limits
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub cap: usize,
    pub seed: Option<u64>,
}

/// How a review run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub reviewed: usize,
    /// Queue drained; `streak` holds the streak after marking flash done
    pub completed: bool,
    pub streak: Option<u32>,
    /// Grades whose write failed
    pub unsaved: usize,
}

/// Quiz or listening run result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    pub seen: usize,
    pub correct: usize,
    pub completed: bool,
    pub streak: Option<u32>,
}

enum Step {
    Line(String),
    Quit,
}

struct Console<R, W> {
    input: R,
    output: W,
}

pub struct Trainer<'s, D, R, W> {
    storage: &'s Storage,
    progress: Box<dyn SchedulingStore + 's>,
    decks: &'s D,
    console: Console<R, W>,
    options: SessionOptions,
    clock: Clock<'s>,
}

impl<'s, D, R, W> Trainer<'s, D, R, W>
where
    D: DeckSource,
    R: BufRead,
    W: Write,
{
    pub fn new(storage: &'s Storage, decks: &'s D, input: R, output: W, options: SessionOptions) -> Self {
        Self {
            storage,
            progress: Box::new(storage.progress()),
            decks,
            console: Console { input, output },
            options,
            clock: Box::new(Utc::now),
        }
    }

    /// Keep scheduling records somewhere other than `storage`
    pub fn with_store(mut self, store: impl SchedulingStore + 's) -> Self {
        self.progress = Box::new(store);
        self
    }

    /// Replace the wall clock
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 's) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn into_output(self) -> W {
        self.console.output
    }

    fn now_millis(&self) -> i64 {
        (self.clock)().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        (self.clock)().date_naive()
    }

    /// Level to use when none is given: stored selection, then `fallback`
    pub fn current_level(&self, fallback: &str) -> AppResult<String> {
        Ok(self
            .storage
            .selected_level()?
            .unwrap_or_else(|| fallback.to_string()))
    }

    // ==================== Flashcards ====================

    pub fn review(&mut self, level_id: &str) -> AppResult<ReviewOutcome> {
        let deck = self.decks.load(level_id)?;
        let now = self.now_millis();
        let mut rng = session_rng(self.options.seed);

        let due = compute_due_set(
            level_id,
            &deck.flashcards,
            &*self.progress,
            now,
            self.options.cap,
            &mut rng,
        )?;
        tracing::info!(level = level_id, due = due.len(), "review session started");
        writeln!(self.console.output, "{} - {} card(s) due", deck.meta.title, due.len())?;

        let mut session = ReviewSession::new(level_id, SessionQueue::start(due), &mut *self.progress);
        let mut unsaved = 0;

        while let Some(card) = session.next_card() {
            let remaining = session.remaining();
            let record = match session.current_record() {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(error = %err, card_id = %card.id, "could not read card state");
                    SchedulingRecord::default()
                }
            };

            let grade = match self.console.show_card(card, &record, remaining)? {
                Some(grade) => grade,
                None => {
                    let reviewed = session.reviewed();
                    tracing::info!(level = level_id, reviewed, "review session abandoned");
                    writeln!(self.console.output, "Stopped. {} card(s) reviewed.", reviewed)?;
                    return Ok(ReviewOutcome {
                        reviewed,
                        completed: false,
                        streak: None,
                        unsaved,
                    });
                }
            };

            match session.grade_current(grade, (self.clock)().timestamp_millis()) {
                Ok(next) => {
                    tracing::debug!(card_id = %card.id, %grade, leitner_box = next.leitner_box, due = next.due, "card graded");
                }
                Err(SchedulerError::Persistence(msg)) => {
                    unsaved += 1;
                    tracing::warn!(card_id = %card.id, error = %msg, "grade not saved");
                    writeln!(self.console.output, "Warning: progress could not be saved ({})", msg)?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        let reviewed = session.reviewed();
        let streak = self.storage.daily().mark_done(self.today(), Activity::Flash)?;
        writeln!(self.console.output, "All due cards reviewed! Streak: {} day(s)", streak)?;

        Ok(ReviewOutcome {
            reviewed,
            completed: true,
            streak: Some(streak),
            unsaved,
        })
    }

    // ==================== Quiz / Listening ====================

    pub fn quiz(&mut self, level_id: &str) -> AppResult<PassOutcome> {
        let deck = self.decks.load(level_id)?;
        let total = deck.quiz.len();
        let mut correct = 0;

        for (i, item) in deck.quiz.iter().enumerate() {
            writeln!(self.console.output)?;
            writeln!(self.console.output, "[{}/{}] {}", i + 1, total, item.prompt_de)?;
            if !item.hint_en.is_empty() {
                writeln!(self.console.output, "  ({})", item.hint_en)?;
            }

            let answer = match self.console.prompt("Answer ([q] quit) > ")? {
                Step::Line(answer) => answer,
                Step::Quit => {
                    writeln!(self.console.output, "Stopped. {}/{} correct.", correct, i)?;
                    return Ok(PassOutcome {
                        seen: i,
                        correct,
                        completed: false,
                        streak: None,
                    });
                }
            };

            if item.accepts(&answer) {
                correct += 1;
                writeln!(self.console.output, "✅ Richtig!")?;
            } else {
                writeln!(self.console.output, "❌ Lösung: {}", item.solution().unwrap_or("-"))?;
            }
        }

        let streak = self.storage.daily().mark_done(self.today(), Activity::Quiz)?;
        tracing::info!(level = level_id, correct, total, "quiz finished");
        writeln!(self.console.output, "Quiz finished! {}/{} correct. Streak: {} day(s)", correct, total, streak)?;

        Ok(PassOutcome {
            seen: total,
            correct,
            completed: true,
            streak: Some(streak),
        })
    }

    pub fn listen(&mut self, level_id: &str) -> AppResult<PassOutcome> {
        let deck = self.decks.load(level_id)?;
        let total = deck.listen.len();

        for (i, item) in deck.listen.iter().enumerate() {
            writeln!(self.console.output)?;
            writeln!(self.console.output, "[{}/{}] {}", i + 1, total, item.de)?;
            writeln!(self.console.output, "  {}", item.en)?;

            if let Step::Quit = self.console.prompt("[Enter] next, [q] quit > ")? {
                return Ok(PassOutcome {
                    seen: i + 1,
                    correct: 0,
                    completed: false,
                    streak: None,
                });
            }
        }

        let streak = self.storage.daily().mark_done(self.today(), Activity::Listen)?;
        writeln!(self.console.output, "Listening finished! Streak: {} day(s)", streak)?;

        Ok(PassOutcome {
            seen: total,
            correct: 0,
            completed: true,
            streak: Some(streak),
        })
    }

    // ==================== Level / Status ====================

    /// Show the level overview and today's progress
    pub fn status(&mut self, level_id: &str) -> AppResult<()> {
        let deck = self.decks.load(level_id)?;
        self.print_overview(level_id, &deck)?;

        let daily = self.storage.daily();
        let today = daily.completion(self.today())?;
        writeln!(self.console.output, "Today: {}", format_completion(&today))?;
        writeln!(self.console.output, "Streak: {} day(s)", daily.streak()?)?;
        self.list_levels(level_id)?;
        Ok(())
    }

    /// Print the levels the deck source offers, marking `current`
    pub fn list_levels(&mut self, current: &str) -> AppResult<Vec<String>> {
        let levels = self.decks.levels()?;
        if levels.is_empty() {
            writeln!(self.console.output, "No decks found.")?;
            return Ok(levels);
        }

        let shown = levels
            .iter()
            .map(|l| if l == current { format!("{} (current)", l) } else { l.clone() })
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(self.console.output, "Levels: {}", shown)?;
        Ok(levels)
    }

    /// Switch the selected level; the deck must load
    pub fn select_level(&mut self, level_id: &str) -> AppResult<()> {
        let deck = self.decks.load(level_id)?;
        self.storage.select_level(level_id)?;
        tracing::info!(level = level_id, "level selected");
        self.print_overview(level_id, &deck)
    }

    fn print_overview(&mut self, level_id: &str, deck: &Deck) -> AppResult<()> {
        let summary = due_summary(level_id, &deck.flashcards, &*self.progress, self.now_millis())?;
        writeln!(self.console.output, "Track: {} ({})", deck.meta.title, level_id)?;
        writeln!(self.console.output, "Vocab cards: {} • Due today: {}", summary.total, summary.due)?;
        if !deck.meta.includes.is_empty() {
            writeln!(self.console.output, "Includes: {}", deck.meta.includes.join(", "))?;
        }
        Ok(())
    }

    /// Clear today's completion flags; scheduling and streak are kept
    pub fn reset_today(&mut self) -> AppResult<bool> {
        let today = self.today();
        let cleared = self.storage.daily().reset_day(today)?;
        if cleared {
            writeln!(self.console.output, "Today's progress was reset.")?;
        } else {
            writeln!(self.console.output, "Nothing recorded today.")?;
        }
        Ok(cleared)
    }

    // ==================== Backup ====================

    pub fn export(&mut self, path: &Path) -> AppResult<usize> {
        let snapshot = export_snapshot(self.storage)?;
        std::fs::write(path, snapshot.to_json_pretty()?)?;
        tracing::info!(path = %path.display(), records = snapshot.progress.len(), "progress exported");
        writeln!(self.console.output, "Exported {} record(s) to {}", snapshot.progress.len(), path.display())?;
        Ok(snapshot.progress.len())
    }

    pub fn import(&mut self, path: &Path) -> AppResult<ImportSummary> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot = ProgressSnapshot::from_json(&raw)?;
        let summary = import_snapshot(self.storage, &snapshot)?;
        writeln!(
            self.console.output,
            "Imported! {} record(s), {} active day(s).",
            summary.records, summary.days
        )?;
        Ok(summary)
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Read one trimmed line; EOF and `q` both quit
    fn prompt(&mut self, text: &str) -> AppResult<Step> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(Step::Quit);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case(QUIT) {
            return Ok(Step::Quit);
        }
        Ok(Step::Line(line.to_string()))
    }

    /// Front, reveal, back, grade prompt. `None` means the user quit.
    fn show_card(&mut self, card: &Card, record: &SchedulingRecord, remaining: usize) -> AppResult<Option<Grade>> {
        writeln!(self.output)?;
        writeln!(self.output, "{}    ({} left today)", card.de, remaining)?;
        if let Step::Quit = self.prompt("[Enter] reveal, [q] quit > ")? {
            return Ok(None);
        }

        writeln!(self.output, "{}  =  {}", card.de, card.en)?;
        if let Some(note) = card.note.as_deref().filter(|n| !n.is_empty()) {
            writeln!(self.output, "  {}", note)?;
        }

        let preview = preview_intervals(record);
        let choices = Grade::ALL
            .iter()
            .zip(preview)
            .map(|(g, days)| format!("[{}] {} ({}d)", g.signal(), g.label(), days))
            .collect::<Vec<_>>()
            .join("  ");

        loop {
            let line = match self.prompt(&format!("{}  [q] quit > ", choices))? {
                Step::Line(line) => line,
                Step::Quit => return Ok(None),
            };
            match line.parse::<i64>().ok().and_then(|n| Grade::try_from(n).ok()) {
                Some(grade) => return Ok(Some(grade)),
                None => writeln!(self.output, "Please answer 1, 2, 3 or 4.")?,
            }
        }
    }
}

fn format_completion(completion: &DayCompletion) -> String {
    Activity::ALL
        .iter()
        .map(|a| format!("{} {}", if completion.is_done(*a) { "✔" } else { "·" }, a))
        .collect::<Vec<_>>()
        .join("  ")
}
