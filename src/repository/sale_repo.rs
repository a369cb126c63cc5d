// ==========================================
// 后台运营系统 - 销售单/销售状态数据仓储
// ==========================================
// 对齐: sale / sale_status_event 表
// 红线: 状态事件只追加；"最新" = event_id 最大
// ==========================================

use crate::domain::{Actor, Sale, SaleStatusEvent};
use crate::repository::codec::parse_text_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::status_repo::SaleStatusRepository;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const EVENT_COLUMNS: &str = "event_id, sale_id, status, description, actor_id, created_at";

// ==========================================
// SaleRepositoryImpl
// ==========================================
pub struct SaleRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl SaleRepositoryImpl {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增销售单（种子数据/运维使用）
    pub fn insert_sale(
        &self,
        sale_id: i64,
        sale_code: &str,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO sale (sale_id, sale_code, created_at) VALUES (?1, ?2, ?3)",
            params![sale_id, sale_code, created_at],
        )?;
        Ok(sale_id)
    }

    /// 查询销售单的完整状态历史（按追加顺序）
    pub fn list_events(&self, sale_id: i64) -> RepositoryResult<Vec<SaleStatusEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sale_status_event WHERE sale_id = ?1 ORDER BY event_id ASC",
            EVENT_COLUMNS
        ))?;

        let events = stmt
            .query_map(params![sale_id], map_event_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(events)
    }
}

fn map_event_row(row: &Row) -> SqliteResult<SaleStatusEvent> {
    Ok(SaleStatusEvent {
        event_id: Some(row.get(0)?),
        sale_id: row.get(1)?,
        status: parse_text_column(2, row.get(2)?)?,
        description: row.get(3)?,
        actor: Actor::from_id(&row.get::<_, String>(4)?),
        created_at: row.get(5)?,
    })
}

#[async_trait]
impl SaleStatusRepository for SaleRepositoryImpl {
    async fn fetch_all_sales(&self, page_size: usize) -> RepositoryResult<Vec<Sale>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT sale_id, sale_code, created_at
            FROM sale
            ORDER BY sale_id ASC
            LIMIT ?1
            "#,
        )?;

        let sales = stmt
            .query_map(params![page_size as i64], |row| {
                Ok(Sale {
                    sale_id: row.get(0)?,
                    sale_code: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(sales)
    }

    async fn get_latest_event(&self, sale_id: i64) -> RepositoryResult<Option<SaleStatusEvent>> {
        let conn = self.get_conn()?;
        let event = conn
            .query_row(
                &format!(
                    "SELECT {} FROM sale_status_event WHERE sale_id = ?1 \
                     ORDER BY event_id DESC LIMIT 1",
                    EVENT_COLUMNS
                ),
                params![sale_id],
                map_event_row,
            )
            .optional()?;
        Ok(event)
    }

    async fn append_event(&self, event: &SaleStatusEvent) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sale_status_event (
                sale_id, status, description, actor_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                event.sale_id,
                event.status.as_str(),
                event.description,
                event.actor.id(),
                event.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SaleStatus;

    fn setup_repo() -> SaleRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        SaleRepositoryImpl::new(Arc::new(Mutex::new(conn)))
    }

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_append_and_latest() {
        let repo = setup_repo();
        repo.insert_sale(7, "SDS-7", now()).unwrap();

        let manual = SaleStatusEvent {
            event_id: None,
            sale_id: 7,
            status: SaleStatus::UnderReview,
            description: "revisado por backoffice".to_string(),
            actor: Actor::User("u-1".to_string()),
            created_at: now(),
        };
        repo.append_event(&manual).await.unwrap();

        let latest = repo.get_latest_event(7).await.unwrap().unwrap();
        assert_eq!(latest.status, SaleStatus::UnderReview);
        assert_eq!(latest.actor, Actor::User("u-1".to_string()));

        assert!(repo.get_latest_event(8).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_event_for_unknown_sale_violates_foreign_key() {
        let repo = setup_repo();
        let event = SaleStatusEvent::automated(99, SaleStatus::Approved, "", now());

        let err = repo.append_event(&event).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
