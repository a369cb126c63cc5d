// ==========================================
// 后台运营系统 - 对账批次数据仓储
// ==========================================
// 对齐: reconcile_run 表
// 红线: Repository 不做业务逻辑,只做数据映射
// ==========================================

use crate::domain::ReconcileRun;
use crate::repository::codec::parse_text_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ReconcileRunRepository - 对账批次仓储
// ==========================================
pub struct ReconcileRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReconcileRunRepository {
    /// 创建新的对账批次仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入批次记录
    ///
    /// # 返回
    /// - `Ok(run_id)`: 成功插入
    pub fn insert(&self, run: &ReconcileRun) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO reconcile_run (
                run_id, kind, source_name, total_rows, accepted,
                outcome, triggered_by, started_at, finished_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                run.run_id,
                run.kind.to_string(),
                run.source_name,
                run.total_rows as i64,
                run.accepted as i64,
                run.outcome.to_string(),
                run.triggered_by,
                run.started_at,
                run.finished_at,
            ],
        )?;

        Ok(run.run_id.clone())
    }

    /// 按 run_id 查询
    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<Option<ReconcileRun>> {
        let conn = self.get_conn()?;

        let run = conn
            .query_row(
                r#"
                SELECT run_id, kind, source_name, total_rows, accepted,
                       outcome, triggered_by, started_at, finished_at
                FROM reconcile_run
                WHERE run_id = ?1
                "#,
                params![run_id],
                map_row,
            )
            .optional()?;
        Ok(run)
    }

    /// 查询最近的批次（新 → 旧）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ReconcileRun>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, kind, source_name, total_rows, accepted,
                   outcome, triggered_by, started_at, finished_at
            FROM reconcile_run
            ORDER BY started_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let runs = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(runs)
    }
}

fn map_row(row: &Row) -> SqliteResult<ReconcileRun> {
    Ok(ReconcileRun {
        run_id: row.get(0)?,
        kind: parse_text_column(1, row.get(1)?)?,
        source_name: row.get(2)?,
        total_rows: row.get::<_, i64>(3)? as usize,
        accepted: row.get::<_, i64>(4)? as usize,
        outcome: parse_text_column(5, row.get(5)?)?,
        triggered_by: row.get(6)?,
        started_at: row.get(7)?,
        finished_at: row.get(8)?,
    })
}
