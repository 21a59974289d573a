//! SQLite 离线存储模块
//!
//! Local persistence for the Deutsch Daily trainer:
//! - 每张卡片的调度状态 (`scheduling_record`)
//! - 每日完成记录与连续天数 (`day_completion`, `app_metadata`)
//! - JSON 备份导出/导入
//!
//! Access is serialized through one `Arc<Mutex<Connection>>`. Two processes
//! writing the same database get last-write-wins per record.

// ============================================================
// 子模块声明
// ============================================================

pub mod backup;
pub mod daily;
pub mod migrations;
pub mod progress;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use backup::{export_snapshot, import_snapshot, ImportSummary, ProgressSnapshot};
pub use daily::{Activity, DailyProgressRepository, DayCompletion};
pub use migrations::run_migrations;
pub use progress::ProgressRepository;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use deutsch_daily_algo::SchedulerError;
use rusqlite::{Connection, OptionalExtension};
use thiserror::Error;

// ============================================================
// 错误类型定义
// ============================================================

/// 存储模块错误类型
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("import rejected: {0}")]
    Import(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to acquire database lock: {0}")]
    LockError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for SchedulerError {
    fn from(err: StorageError) -> Self {
        SchedulerError::Persistence(err.to_string())
    }
}

// ============================================================
// 元数据键
// ============================================================

/// Currently selected level
pub const META_LEVEL: &str = "level";
/// Consecutive active days
pub const META_STREAK: &str = "streak";
/// Last day (`YYYY-MM-DD`) on which any activity was completed
pub const META_LAST_DAY: &str = "last_day";

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ============================================================
// Storage - 统一存储结构体
// ============================================================

/// 统一存储结构体
///
/// Owns the connection and hands out repositories sharing it.
pub struct Storage {
    conn: Arc<Mutex<Connection>>,
    db_path: String,
}

impl Storage {
    /// 打开（或创建）数据库文件并运行迁移
    ///
    /// Missing parent directories are created.
    pub fn new<P: AsRef<Path>>(db_path: P) -> StorageResult<Self> {
        let path = db_path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let connection = Connection::open(path)?;
        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;",
        )?;

        Self::from_connection(connection, path.to_string_lossy().to_string())
    }

    /// 创建内存数据库（用于测试）
    pub fn in_memory() -> StorageResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::from_connection(connection, ":memory:".to_string())
    }

    fn from_connection(connection: Connection, db_path: String) -> StorageResult<Self> {
        let version = migrations::run_migrations(&connection)?;
        log::debug!("opened {} at schema v{}", db_path, version);

        Ok(Self {
            conn: Arc::new(Mutex::new(connection)),
            db_path,
        })
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 调度记录仓库
    pub fn progress(&self) -> ProgressRepository {
        ProgressRepository::new(Arc::clone(&self.conn))
    }

    /// 每日完成记录仓库
    pub fn daily(&self) -> DailyProgressRepository {
        DailyProgressRepository::new(Arc::clone(&self.conn))
    }

    pub(crate) fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        lock_connection(&self.conn)
    }

    /// 执行事务
    ///
    /// The closure's writes are committed together or not at all.
    pub fn transaction<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> StorageResult<T>,
    {
        let mut conn = self.lock()?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;

        Ok(result)
    }

    // ========== 元数据操作 ==========

    pub fn get_meta(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.lock()?;
        get_meta(&conn, key)
    }

    pub fn set_meta(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.lock()?;
        set_meta(&conn, key, value)
    }

    /// Selected level, if one was ever chosen
    pub fn selected_level(&self) -> StorageResult<Option<String>> {
        self.get_meta(META_LEVEL)
    }

    pub fn select_level(&self, level_id: &str) -> StorageResult<()> {
        self.set_meta(META_LEVEL, level_id)
    }
}

pub(crate) fn lock_connection(
    conn: &Arc<Mutex<Connection>>,
) -> StorageResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StorageError::LockError(e.to_string()))
}

pub(crate) fn get_meta(conn: &Connection, key: &str) -> StorageResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM app_metadata WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub(crate) fn set_meta(conn: &Connection, key: &str, value: &str) -> StorageResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO app_metadata (key, value, updated_at) VALUES (?1, ?2, datetime('now'))",
        [key, value],
    )?;
    Ok(())
}

// ============================================================
// 测试
// ============================================================
