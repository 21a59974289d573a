//! 调度记录数据库操作模块
//!
//! Durable `SchedulingStore`: one row per (level, card) that has been graded
//! at least once. Unseen cards have no row and read back as the default
//! record; reading never inserts.

use std::sync::{Arc, Mutex};

use deutsch_daily_algo::sanitize::sanitize_record;
use deutsch_daily_algo::{ReviewKey, SchedulerResult, SchedulingRecord, SchedulingStore};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::{lock_connection, now_millis, StorageResult};

// ============================================================
// ProgressRepository - 调度记录仓储
// ============================================================

pub struct ProgressRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProgressRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    // ========== 基本操作 ==========

    /// 获取单个调度记录，不存在时返回 None
    pub fn get_record(&self, level_id: &str, card_id: &str) -> StorageResult<Option<SchedulingRecord>> {
        let conn = lock_connection(&self.conn)?;

        let record = conn
            .query_row(
                "SELECT box, ease, due FROM scheduling_record WHERE level_id = ?1 AND card_id = ?2",
                params![level_id, card_id],
                record_from_row,
            )
            .optional()?;

        Ok(record)
    }

    /// 保存调度记录 (插入或更新)
    pub fn save_record(
        &self,
        level_id: &str,
        card_id: &str,
        record: &SchedulingRecord,
    ) -> StorageResult<()> {
        let conn = lock_connection(&self.conn)?;
        upsert_record(&conn, level_id, card_id, record)?;
        log::debug!(
            "saved {}:{} box={} ease={:.2} due={}",
            level_id,
            card_id,
            record.leitner_box,
            record.ease,
            record.due
        );
        Ok(())
    }

    // ========== 查询方法 ==========

    /// 所有调度记录，按键排序
    pub fn all_records(&self) -> StorageResult<Vec<(ReviewKey, SchedulingRecord)>> {
        let conn = lock_connection(&self.conn)?;
        all_records(&conn)
    }

    /// 已评分卡片数
    pub fn count(&self) -> StorageResult<i64> {
        let conn = lock_connection(&self.conn)?;
        let count = conn.query_row("SELECT COUNT(*) FROM scheduling_record", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl SchedulingStore for ProgressRepository {
    fn get(&self, level_id: &str, card_id: &str) -> SchedulerResult<SchedulingRecord> {
        Ok(self.get_record(level_id, card_id)?.unwrap_or_default())
    }

    fn put(
        &mut self,
        level_id: &str,
        card_id: &str,
        record: SchedulingRecord,
    ) -> SchedulerResult<()> {
        if let Err(e) = self.save_record(level_id, card_id, &record) {
            log::error!("failed to persist {}:{}: {}", level_id, card_id, e);
            return Err(e.into());
        }
        Ok(())
    }
}

// ============================================================
// 行映射与连接级操作
// ============================================================

fn record_from_row(row: &Row) -> rusqlite::Result<SchedulingRecord> {
    let leitner_box: i64 = row.get("box")?;
    let ease: f64 = row.get("ease")?;
    let due: i64 = row.get("due")?;

    Ok(sanitize_record(SchedulingRecord::new(
        leitner_box.clamp(0, i64::from(u8::MAX)) as u8,
        ease,
        due,
    )))
}

pub(crate) fn upsert_record(
    conn: &Connection,
    level_id: &str,
    card_id: &str,
    record: &SchedulingRecord,
) -> StorageResult<()> {
    let record = sanitize_record(*record);
    conn.execute(
        r#"
        INSERT INTO scheduling_record (level_id, card_id, box, ease, due, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(level_id, card_id) DO UPDATE SET
            box = excluded.box,
            ease = excluded.ease,
            due = excluded.due,
            updated_at = excluded.updated_at
        "#,
        params![
            level_id,
            card_id,
            record.leitner_box,
            record.ease,
            record.due,
            now_millis()
        ],
    )?;
    Ok(())
}

pub(crate) fn all_records(conn: &Connection) -> StorageResult<Vec<(ReviewKey, SchedulingRecord)>> {
    let mut stmt = conn.prepare(
        "SELECT level_id, card_id, box, ease, due FROM scheduling_record ORDER BY level_id, card_id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            let level_id: String = row.get("level_id")?;
            let card_id: String = row.get("card_id")?;
            Ok((ReviewKey::new(level_id, card_id), record_from_row(row)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub(crate) fn clear_records(conn: &Connection) -> StorageResult<usize> {
    Ok(conn.execute("DELETE FROM scheduling_record", [])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Storage;
    use deutsch_daily_algo::{grade, Grade, MS_PER_DAY};

    const T: i64 = 1_700_000_000_000;

    #[test]
    fn test_get_unknown_is_default_and_not_inserted() {
        let storage = Storage::in_memory().unwrap();
        let repo = storage.progress();

        assert_eq!(repo.get("a1", "haus").unwrap(), SchedulingRecord::default());
        assert_eq!(repo.get_record("a1", "haus").unwrap(), None);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_put_then_get() {
        let storage = Storage::in_memory().unwrap();
        let mut repo = storage.progress();

        let record = grade(&SchedulingRecord::default(), Grade::Easy, T);
        repo.put("a1", "haus", record).unwrap();

        let loaded = repo.get("a1", "haus").unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.due, T + 19 * MS_PER_DAY);
    }

    #[test]
    fn test_upsert_overwrites() {
        let storage = Storage::in_memory().unwrap();
        let mut repo = storage.progress();

        repo.put("a1", "haus", SchedulingRecord::new(2, 2.5, 10)).unwrap();
        repo.put("a1", "haus", SchedulingRecord::new(4, 2.7, 20)).unwrap();

        assert_eq!(repo.get("a1", "haus").unwrap(), SchedulingRecord::new(4, 2.7, 20));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_levels_are_distinct() {
        let storage = Storage::in_memory().unwrap();
        let mut repo = storage.progress();

        repo.put("a1", "haus", SchedulingRecord::new(5, 2.9, 99)).unwrap();
        assert_eq!(repo.get("a2", "haus").unwrap(), SchedulingRecord::default());

        let all = repo.all_records().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0.level_id, "a1");
    }

    #[test]
    fn test_out_of_range_rows_are_sanitized() {
        let storage = Storage::in_memory().unwrap();
        {
            let conn = storage.lock().unwrap();
            conn.execute(
                "INSERT INTO scheduling_record (level_id, card_id, box, ease, due, updated_at)
                 VALUES ('a1', 'x', 3, 9.5, 5, 0)",
                [],
            )
            .unwrap();
        }

        let record = storage.progress().get("a1", "x").unwrap();
        assert_eq!(record.leitner_box, 3);
        assert_eq!(record.ease, 3.2);
        assert_eq!(record.due, 5);
    }

    #[test]
    fn test_all_records_sorted() {
        let storage = Storage::in_memory().unwrap();
        let mut repo = storage.progress();
        repo.put("b1", "z", SchedulingRecord::default()).unwrap();
        repo.put("a1", "y", SchedulingRecord::default()).unwrap();
        repo.put("a1", "x", SchedulingRecord::default()).unwrap();

        let keys: Vec<String> = repo
            .all_records()
            .unwrap()
            .into_iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(keys, vec!["a1:x", "a1:y", "b1:z"]);
    }
}
