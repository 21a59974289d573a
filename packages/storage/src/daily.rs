//! 每日完成记录与连续天数
//!
//! A day counts as active once any activity is completed. The streak grows
//! by one when the previous active day was yesterday and restarts at 1
//! otherwise; further completions on the same day leave it alone.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::{get_meta, lock_connection, now_millis, set_meta, StorageError, StorageResult};
use crate::{META_LAST_DAY, META_STREAK};

/// Day key format (`YYYY-MM-DD`)
pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DAY_FORMAT).ok()
}

// ============================================================
// Activity / DayCompletion
// ============================================================

/// Daily practice kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Flash,
    Quiz,
    Listen,
}

impl Activity {
    pub const ALL: [Activity; 3] = [Activity::Flash, Activity::Quiz, Activity::Listen];

    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Flash => "flash",
            Activity::Quiz => "quiz",
            Activity::Listen => "listen",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flash" => Ok(Activity::Flash),
            "quiz" => Ok(Activity::Quiz),
            "listen" => Ok(Activity::Listen),
            other => Err(StorageError::Import(format!("unknown activity '{}'", other))),
        }
    }
}

/// Activities completed on one day; serialized with only the `true` flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCompletion {
    #[serde(default, skip_serializing_if = "is_false")]
    pub flash: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub quiz: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub listen: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl DayCompletion {
    pub fn is_done(&self, activity: Activity) -> bool {
        match activity {
            Activity::Flash => self.flash,
            Activity::Quiz => self.quiz,
            Activity::Listen => self.listen,
        }
    }

    pub fn set(&mut self, activity: Activity) {
        match activity {
            Activity::Flash => self.flash = true,
            Activity::Quiz => self.quiz = true,
            Activity::Listen => self.listen = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.flash || self.quiz || self.listen)
    }

    pub fn activities(&self) -> Vec<Activity> {
        Activity::ALL
            .into_iter()
            .filter(|a| self.is_done(*a))
            .collect()
    }
}

// ============================================================
// DailyProgressRepository - 每日进度仓储
// ============================================================

pub struct DailyProgressRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DailyProgressRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 标记某日某项练习完成，并更新连续天数
    ///
    /// # Returns
    /// * `u32` - 更新后的连续天数
    pub fn mark_done(&self, day: NaiveDate, activity: Activity) -> StorageResult<u32> {
        let mut conn = lock_connection(&self.conn)?;
        let tx = conn.transaction()?;

        insert_completion(&tx, &format_day(day), activity)?;
        let streak = bump_streak(&tx, day)?;

        tx.commit()?;
        Ok(streak)
    }

    pub fn completion(&self, day: NaiveDate) -> StorageResult<DayCompletion> {
        let conn = lock_connection(&self.conn)?;

        let mut stmt = conn.prepare("SELECT activity FROM day_completion WHERE day = ?1")?;
        let activities = stmt
            .query_map([format_day(day)], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut completion = DayCompletion::default();
        for raw in activities {
            completion.set(raw.parse()?);
        }
        Ok(completion)
    }

    /// 所有日期的完成记录，按日期排序
    pub fn all_completions(&self) -> StorageResult<BTreeMap<String, DayCompletion>> {
        let conn = lock_connection(&self.conn)?;
        all_completions(&conn)
    }

    /// 当前连续天数（从未完成过时为 0）
    pub fn streak(&self) -> StorageResult<u32> {
        let conn = lock_connection(&self.conn)?;
        read_streak(&conn)
    }

    /// 清除某日的完成记录，连续天数不变
    pub fn reset_day(&self, day: NaiveDate) -> StorageResult<bool> {
        let conn = lock_connection(&self.conn)?;
        let affected = conn.execute(
            "DELETE FROM day_completion WHERE day = ?1",
            [format_day(day)],
        )?;
        Ok(affected > 0)
    }
}

// ============================================================
// 连接级操作
// ============================================================

pub(crate) fn insert_completion(conn: &Connection, day: &str, activity: Activity) -> StorageResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO day_completion (day, activity, completed_at) VALUES (?1, ?2, ?3)",
        params![day, activity.as_str(), now_millis()],
    )?;
    Ok(())
}

pub(crate) fn all_completions(conn: &Connection) -> StorageResult<BTreeMap<String, DayCompletion>> {
    let mut stmt = conn.prepare("SELECT day, activity FROM day_completion ORDER BY day")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut map: BTreeMap<String, DayCompletion> = BTreeMap::new();
    for (day, raw) in rows {
        map.entry(day).or_default().set(raw.parse()?);
    }
    Ok(map)
}

pub(crate) fn clear_completions(conn: &Connection) -> StorageResult<usize> {
    Ok(conn.execute("DELETE FROM day_completion", [])?)
}

fn read_streak(conn: &Connection) -> StorageResult<u32> {
    Ok(get_meta(conn, META_STREAK)?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0))
}

fn bump_streak(conn: &Connection, today: NaiveDate) -> StorageResult<u32> {
    let last_day = get_meta(conn, META_LAST_DAY)?.and_then(|v| parse_day(&v));
    let streak = read_streak(conn)?;

    if last_day == Some(today) {
        return Ok(streak);
    }

    let continued = last_day.is_some() && last_day == today.pred_opt();
    let streak = if continued { streak + 1 } else { 1 };

    set_meta(conn, META_STREAK, &streak.to_string())?;
    set_meta(conn, META_LAST_DAY, &format_day(today))?;
    log::info!("streak is now {} day(s)", streak);

    Ok(streak)
}
