//! JSON 备份导出/导入
//!
//! Snapshot shape:
//!
//! ```json
//! {
//!   "progress": { "a1:haus": { "box": 3, "ease": 2.6, "due": 1700000000000 } },
//!   "done": { "2025-03-01": { "flash": true } },
//!   "level": "a1"
//! }
//! ```
//!
//! Exporting then importing reproduces every scheduling record exactly.
//! Import replaces all progress and completion data in one transaction.

use std::collections::BTreeMap;

use deutsch_daily_algo::sanitize::sanitize_record;
use deutsch_daily_algo::{ReviewKey, SchedulingRecord};
use serde::{Deserialize, Serialize};

use crate::daily::{self, parse_day, Activity, DayCompletion};
use crate::progress;
use crate::{get_meta, set_meta, Storage, StorageError, StorageResult, META_LEVEL};

/// Full progress backup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Scheduling records keyed by `"level:card"`
    #[serde(default)]
    pub progress: BTreeMap<String, SchedulingRecord>,
    /// Completed activities keyed by `YYYY-MM-DD`
    #[serde(default)]
    pub done: BTreeMap<String, DayCompletion>,
    /// Selected level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl ProgressSnapshot {
    pub fn to_json_pretty(&self) -> StorageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> StorageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What an import wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub records: usize,
    pub days: usize,
}

/// Export every record, every completed day, and the selected level
pub fn export_snapshot(storage: &Storage) -> StorageResult<ProgressSnapshot> {
    let conn = storage.lock()?;

    let progress = progress::all_records(&conn)?
        .into_iter()
        .map(|(key, record)| (key.to_string(), record))
        .collect();
    let done = daily::all_completions(&conn)?;
    let level = get_meta(&conn, META_LEVEL)?;

    Ok(ProgressSnapshot {
        progress,
        done,
        level,
    })
}

/// Replace local progress with a snapshot
///
/// The snapshot is validated before anything is written: a malformed key or
/// day rejects the whole import and leaves the database untouched. Records
/// are clamped into their valid ranges.
pub fn import_snapshot(storage: &Storage, snapshot: &ProgressSnapshot) -> StorageResult<ImportSummary> {
    let mut records = Vec::with_capacity(snapshot.progress.len());
    for (raw_key, record) in &snapshot.progress {
        let key = ReviewKey::parse(raw_key)
            .ok_or_else(|| StorageError::Import(format!("malformed progress key '{}'", raw_key)))?;
        records.push((key, sanitize_record(*record)));
    }

    let mut days = Vec::with_capacity(snapshot.done.len());
    for (raw_day, completion) in &snapshot.done {
        let day = parse_day(raw_day)
            .ok_or_else(|| StorageError::Import(format!("malformed day '{}'", raw_day)))?;
        days.push((daily::format_day(day), *completion));
    }

    let summary = storage.transaction(|conn| {
        progress::clear_records(conn)?;
        daily::clear_completions(conn)?;

        for (key, record) in &records {
            progress::upsert_record(conn, &key.level_id, &key.card_id, record)?;
        }

        let mut written_days = 0;
        for (day, completion) in &days {
            for activity in Activity::ALL {
                if completion.is_done(activity) {
                    daily::insert_completion(conn, day, activity)?;
                }
            }
            if !completion.is_empty() {
                written_days += 1;
            }
        }

        if let Some(level) = &snapshot.level {
            set_meta(conn, META_LEVEL, level)?;
        }

        Ok(ImportSummary {
            records: records.len(),
            days: written_days,
        })
    })?;

    log::info!(
        "imported {} scheduling records and {} active days",
        summary.records,
        summary.days
    );
    Ok(summary)
}
