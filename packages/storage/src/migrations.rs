//! 数据库迁移模块
//!
//! Keeps the SQLite schema in step with the application version.
//!
//! ## 迁移策略
//! - 每个迁移在独立事务中执行
//! - 迁移记录存储在 schema_migrations 表中
//! - Already-applied versions are skipped, so running twice is a no-op

use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use crate::{StorageError, StorageResult};

/// 当前数据库 schema 版本
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// 初始化 schema SQL (V1)
const INIT_SCHEMA: &str = include_str!("schema.sql");

/// 迁移记录
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i32,
    pub name: String,
    pub sql: String,
}

impl Migration {
    pub fn new(version: i32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// 获取所有迁移定义，按版本号排序
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration::new(1, "initial schema", INIT_SCHEMA),
        Migration::new(
            2,
            "due index",
            r#"
            -- due-set 查询按级别扫描 due
            CREATE INDEX IF NOT EXISTS idx_scheduling_record_level_due
                ON scheduling_record(level_id, due);

            CREATE INDEX IF NOT EXISTS idx_day_completion_day
                ON day_completion(day);
            "#,
        ),
    ]
}

fn ensure_migrations_table(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        );
        "#,
    )
    .map_err(|e| StorageError::Migration(format!("failed to create schema_migrations: {}", e)))?;

    Ok(())
}

/// 获取当前数据库版本，没有迁移记录时返回 0
pub fn get_current_version(conn: &Connection) -> StorageResult<i32> {
    ensure_migrations_table(conn)?;
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?)
}

fn get_applied_versions(conn: &Connection) -> StorageResult<Vec<i32>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<i32>, _>>()?;
    Ok(versions)
}

/// 运行数据库迁移
///
/// # Returns
/// * `StorageResult<i32>` - 成功返回最终版本号
pub fn run_migrations(conn: &Connection) -> StorageResult<i32> {
    ensure_migrations_table(conn)?;
    let applied = get_applied_versions(conn)?;

    for migration in get_migrations() {
        if applied.contains(&migration.version) {
            continue;
        }
        log::info!("running migration v{}: {}", migration.version, migration.name);
        apply(conn, &migration).map_err(|e| {
            log::error!("migration v{} failed: {}", migration.version, e);
            e
        })?;
    }

    get_current_version(conn)
}

/// Schema change and its bookkeeping row commit together; dropping the
/// transaction on error rolls both back.
fn apply(conn: &Connection, migration: &Migration) -> StorageResult<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    tx.execute_batch(&migration.sql).map_err(|e| {
        StorageError::Migration(format!("v{} ({}): {}", migration.version, migration.name, e))
    })?;
    tx.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
        params![migration.version, migration.name, chrono::Utc::now().timestamp()],
    )?;

    tx.commit()?;
    Ok(())
}
